//! Square-neighborhood proximity query.

use crate::catalog::ArtifactRepository;
use crate::models::{Artifact, Coordinates};

/// Default neighborhood half-width, in grid steps.
pub const DEFAULT_NEARBY_RADIUS: u32 = 2;

/// Artifacts whose per-axis offsets from `(x, y)` are both within `radius`,
/// excluding anything at `(x, y)` itself. Catalog order, no sorting.
pub fn nearby<C>(catalog: &C, x: i64, y: i64, radius: u32) -> Vec<&Artifact>
where
    C: ArtifactRepository + ?Sized,
{
    let origin = Coordinates::new(x, y);
    let radius = u64::from(radius);
    catalog
        .artifacts()
        .iter()
        .filter(|artifact| {
            let (dx, dy) = artifact.coordinates.axis_offsets(origin);
            dx <= radius && dy <= radius && (dx != 0 || dy != 0)
        })
        .collect()
}

/// [`nearby`] centred on `artifact`'s own position.
pub fn nearby_artifact<'a, C>(catalog: &'a C, artifact: &Artifact, radius: u32) -> Vec<&'a Artifact>
where
    C: ArtifactRepository + ?Sized,
{
    nearby(catalog, artifact.coordinates.x, artifact.coordinates.y, radius)
}
