//! Floor-plan grid derived from catalog coordinates.

use std::collections::HashMap;

use crate::catalog::ArtifactRepository;
use crate::errors::VitrineResult;
use crate::models::{Coordinates, GridCell, GridDimensions, MuseumGrid, ENTRANCE};

/// Build the `width` x `height` floor grid for `catalog`.
///
/// Each cell holds the first catalog artifact at that position, else the
/// entrance marker at [`ENTRANCE`], else nothing. Artifacts outside the grid
/// are left off it. Non-positive dimensions are `InvalidConfiguration`.
pub fn build_grid<C>(catalog: &C, width: i64, height: i64) -> VitrineResult<MuseumGrid>
where
    C: ArtifactRepository + ?Sized,
{
    let dimensions = GridDimensions::new(width, height)?;
    Ok(build_grid_with(catalog, dimensions))
}

/// [`build_grid`] for dimensions that are already validated.
pub fn build_grid_with<C>(catalog: &C, dimensions: GridDimensions) -> MuseumGrid
where
    C: ArtifactRepository + ?Sized,
{
    let mut occupants: HashMap<Coordinates, &str> = HashMap::new();
    for artifact in catalog.artifacts() {
        occupants
            .entry(artifact.coordinates)
            .or_insert(artifact.id.as_str());
    }

    let cells = (0..dimensions.height())
        .map(|y| {
            (0..dimensions.width())
                .map(|x| {
                    let here = Coordinates::new(x, y);
                    match occupants.get(&here) {
                        Some(id) => GridCell::artifact(x, y, *id),
                        None if here == ENTRANCE => GridCell::entrance(x, y),
                        None => GridCell::empty(x, y),
                    }
                })
                .collect()
        })
        .collect();

    MuseumGrid {
        width: dimensions.width(),
        height: dimensions.height(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reference_artifacts;
    use crate::errors::VitrineError;
    use crate::models::{CellKind, MUSEUM_GRID_HEIGHT, MUSEUM_GRID_WIDTH};

    #[test]
    fn test_reference_grid_shape() {
        let grid = build_grid(&reference_artifacts(), MUSEUM_GRID_WIDTH, MUSEUM_GRID_HEIGHT).unwrap();
        assert_eq!(grid.cells.len(), 8);
        assert!(grid.cells.iter().all(|row| row.len() == 10));
        assert_eq!(grid.cell_count(), 80);
        for (y, row) in grid.cells.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                assert_eq!((cell.x, cell.y), (x as i64, y as i64));
            }
        }
    }

    #[test]
    fn test_reference_grid_places_every_artifact() {
        let artifacts = reference_artifacts();
        let grid = build_grid(&artifacts, 10, 8).unwrap();
        assert_eq!(grid.artifact_cells().count(), 8);
        let mask = grid.cell(2, 3).unwrap();
        assert_eq!(mask.kind, CellKind::Artifact);
        assert_eq!(mask.artifact_id.as_deref(), Some("1"));
        assert_eq!(grid.locate("8").unwrap().coordinates(), Coordinates::new(8, 2));
    }

    #[test]
    fn test_entrance_at_origin() {
        let grid = build_grid(&reference_artifacts(), 10, 8).unwrap();
        let origin = grid.cell(0, 0).unwrap();
        assert_eq!(origin.kind, CellKind::Entrance);
        assert!(origin.artifact_id.is_none());
        let entrances = grid
            .iter_cells()
            .filter(|c| c.kind == CellKind::Entrance)
            .count();
        assert_eq!(entrances, 1);
    }

    #[test]
    fn test_artifact_at_origin_replaces_entrance() {
        let mut artifacts = reference_artifacts();
        artifacts[0].coordinates = Coordinates::new(0, 0);
        let grid = build_grid(&artifacts, 10, 8).unwrap();
        let origin = grid.cell(0, 0).unwrap();
        assert_eq!(origin.kind, CellKind::Artifact);
        assert!(grid.iter_cells().all(|c| c.kind != CellKind::Entrance));
    }

    #[test]
    fn test_collision_keeps_first_in_catalog_order() {
        let mut artifacts = reference_artifacts();
        artifacts[3].coordinates = artifacts[1].coordinates;
        let grid = build_grid(&artifacts, 10, 8).unwrap();
        assert_eq!(grid.cell(4, 2).unwrap().artifact_id.as_deref(), Some("2"));
        assert!(grid.locate("4").is_none());
    }

    #[test]
    fn test_out_of_bounds_artifacts_are_omitted() {
        let artifacts = reference_artifacts();
        let grid = build_grid(&artifacts, 3, 4).unwrap();
        // Only the mask at (2,3) fits inside 3x4.
        let placed: Vec<_> = grid
            .artifact_cells()
            .filter_map(|c| c.artifact_id.clone())
            .collect();
        assert_eq!(placed, vec!["1".to_string()]);
    }

    #[test]
    fn test_reserved_kinds_never_emitted() {
        let grid = build_grid(&reference_artifacts(), 10, 8).unwrap();
        assert!(grid
            .iter_cells()
            .all(|c| !matches!(c.kind, CellKind::Wall | CellKind::Exit)));
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        let artifacts = reference_artifacts();
        for (w, h) in [(0, 8), (10, 0), (-3, 2)] {
            assert!(matches!(
                build_grid(&artifacts, w, h),
                Err(VitrineError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_out_of_range_lookup_is_none() {
        let grid = build_grid(&reference_artifacts(), 10, 8).unwrap();
        assert!(grid.cell(-1, 0).is_none());
        assert!(grid.cell(10, 0).is_none());
        assert!(grid.cell(0, 8).is_none());
    }
}
