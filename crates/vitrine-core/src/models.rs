//! Shared typed models used across the catalog, query, and store layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{VitrineError, VitrineResult};

// ---------------------------------------------------------------------------
// Floor-plan constants
// ---------------------------------------------------------------------------

/// Width of the reference museum floor grid, in cells.
pub const MUSEUM_GRID_WIDTH: i64 = 10;

/// Height of the reference museum floor grid, in cells.
pub const MUSEUM_GRID_HEIGHT: i64 = 8;

/// The cell marked as the entrance when no artifact occupies it.
pub const ENTRANCE: Coordinates = Coordinates::new(0, 0);

/// Upper bound for [`Artifact::popularity`].
pub const MAX_POPULARITY: i64 = 100;

/// Stable, opaque artifact identifier.
pub type ArtifactId = String;

// ---------------------------------------------------------------------------
// 1. Coordinates
// ---------------------------------------------------------------------------

/// A position on the museum floor grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i64,
    pub y: i64,
}

impl Coordinates {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Per-axis absolute offsets `(dx, dy)` between two points.
    pub fn axis_offsets(self, other: Coordinates) -> (u64, u64) {
        (self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }

    /// Sum of the per-axis offsets, saturating at `u64::MAX`.
    pub fn manhattan_distance(self, other: Coordinates) -> u64 {
        let (dx, dy) = self.axis_offsets(other);
        dx.saturating_add(dy)
    }
}

// ---------------------------------------------------------------------------
// 2. Artifact
// ---------------------------------------------------------------------------

/// A catalog entry.
///
/// Serialized with camelCase keys (`imageUrl`, `dateAdded`) so JSON catalogs
/// authored for the web client load unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: ArtifactId,
    pub name: String,
    pub description: String,
    pub era: String,
    pub origin: String,
    pub image_url: String,
    pub category: String,
    pub coordinates: Coordinates,
    pub popularity: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<String>,
    pub date_added: NaiveDate,
}

impl Artifact {
    /// Case-insensitive tag membership; tag order is irrelevant.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

// ---------------------------------------------------------------------------
// 3. GridDimensions
// ---------------------------------------------------------------------------

/// Validated, strictly positive grid size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGridDimensions")]
pub struct GridDimensions {
    width: i64,
    height: i64,
}

#[derive(Deserialize)]
struct RawGridDimensions {
    width: i64,
    height: i64,
}

impl TryFrom<RawGridDimensions> for GridDimensions {
    type Error = VitrineError;

    fn try_from(raw: RawGridDimensions) -> VitrineResult<Self> {
        Self::new(raw.width, raw.height)
    }
}

impl GridDimensions {
    /// Dimensions of the reference deployment.
    pub const MUSEUM: GridDimensions = GridDimensions {
        width: MUSEUM_GRID_WIDTH,
        height: MUSEUM_GRID_HEIGHT,
    };

    pub fn new(width: i64, height: i64) -> VitrineResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(VitrineError::InvalidConfiguration(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn contains(&self, coordinates: Coordinates) -> bool {
        (0..self.width).contains(&coordinates.x) && (0..self.height).contains(&coordinates.y)
    }

    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self::MUSEUM
    }
}

// ---------------------------------------------------------------------------
// 4. GridCell
// ---------------------------------------------------------------------------

/// What occupies a floor cell. `Wall` and `Exit` are reserved; the builder
/// never emits them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Empty,
    Artifact,
    Wall,
    Entrance,
    Exit,
}

/// One cell of the floor grid. `artifact_id` is set iff `kind == Artifact`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
    #[serde(rename = "type")]
    pub kind: CellKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<ArtifactId>,
}

impl GridCell {
    pub fn empty(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            kind: CellKind::Empty,
            artifact_id: None,
        }
    }

    pub fn entrance(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            kind: CellKind::Entrance,
            artifact_id: None,
        }
    }

    pub fn artifact(x: i64, y: i64, artifact_id: impl Into<ArtifactId>) -> Self {
        Self {
            x,
            y,
            kind: CellKind::Artifact,
            artifact_id: Some(artifact_id.into()),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// 5. MuseumGrid
// ---------------------------------------------------------------------------

/// Dense floor plan derived from a catalog. `cells[y][x]` is position `(x, y)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuseumGrid {
    pub width: i64,
    pub height: i64,
    pub cells: Vec<Vec<GridCell>>,
}

impl MuseumGrid {
    pub fn cell(&self, x: i64, y: i64) -> Option<&GridCell> {
        let row = self.cells.get(usize::try_from(y).ok()?)?;
        row.get(usize::try_from(x).ok()?)
    }

    /// All cells in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().flatten()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// The cell holding `artifact_id`, if it was placed on the grid.
    pub fn locate(&self, artifact_id: &str) -> Option<&GridCell> {
        self.iter_cells()
            .find(|cell| cell.artifact_id.as_deref() == Some(artifact_id))
    }

    pub fn artifact_cells(&self) -> impl Iterator<Item = &GridCell> {
        self.iter_cells().filter(|cell| cell.kind == CellKind::Artifact)
    }
}
