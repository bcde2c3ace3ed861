//! Immutable artifact catalog and the read-only repository seam.
//!
//! Grid, proximity and ranking queries only ever see an
//! [`ArtifactRepository`], so the backing source (static list, JSON file,
//! SQLite) can change without touching them.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::errors::{CatalogViolation, VitrineResult};
use crate::models::{Artifact, Coordinates, GridDimensions, MAX_POPULARITY};

// ---------------------------------------------------------------------------
// Repository trait
// ---------------------------------------------------------------------------

/// Read-only access to an ordered set of artifacts.
pub trait ArtifactRepository {
    /// All artifacts in catalog (insertion) order.
    fn artifacts(&self) -> &[Artifact];

    /// The artifact whose id equals `id`, or `None`.
    fn get_by_id(&self, id: &str) -> Option<&Artifact> {
        self.artifacts().iter().find(|a| a.id == id)
    }

    fn len(&self) -> usize {
        self.artifacts().len()
    }

    fn is_empty(&self) -> bool {
        self.artifacts().is_empty()
    }
}

impl ArtifactRepository for [Artifact] {
    fn artifacts(&self) -> &[Artifact] {
        self
    }
}

impl ArtifactRepository for Vec<Artifact> {
    fn artifacts(&self) -> &[Artifact] {
        self
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A validated, immutable catalog with an id index.
#[derive(Clone, Debug)]
pub struct Catalog {
    artifacts: Vec<Artifact>,
    index: HashMap<String, usize>,
    fingerprint: String,
}

impl Catalog {
    /// Validate `artifacts` against `dimensions` and build the catalog.
    ///
    /// Rejects empty or duplicate ids, coordinates outside the grid,
    /// popularity outside `0..=100`, and two artifacts sharing a cell.
    pub fn new(artifacts: Vec<Artifact>, dimensions: GridDimensions) -> VitrineResult<Self> {
        validate(&artifacts, dimensions)?;
        let index = artifacts
            .iter()
            .enumerate()
            .map(|(position, artifact)| (artifact.id.clone(), position))
            .collect();
        let fingerprint = fingerprint(&artifacts)?;
        Ok(Self {
            artifacts,
            index,
            fingerprint,
        })
    }

    /// Short content hash identifying this exact catalog contents.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Owned copy of the records, for copy-on-write edits.
    pub fn to_vec(&self) -> Vec<Artifact> {
        self.artifacts.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }
}

impl ArtifactRepository for Catalog {
    fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    fn get_by_id(&self, id: &str) -> Option<&Artifact> {
        self.index.get(id).map(|&position| &self.artifacts[position])
    }
}

/// Check every load-time invariant; the first violation wins.
pub fn validate(artifacts: &[Artifact], dimensions: GridDimensions) -> Result<(), CatalogViolation> {
    let mut seen_ids: HashSet<&str> = HashSet::with_capacity(artifacts.len());
    let mut occupied: HashMap<Coordinates, &str> = HashMap::with_capacity(artifacts.len());

    for (position, artifact) in artifacts.iter().enumerate() {
        if artifact.id.trim().is_empty() {
            return Err(CatalogViolation::EmptyId { position });
        }
        if !seen_ids.insert(artifact.id.as_str()) {
            return Err(CatalogViolation::DuplicateId {
                id: artifact.id.clone(),
            });
        }
        if !(0..=MAX_POPULARITY).contains(&artifact.popularity) {
            return Err(CatalogViolation::PopularityOutOfRange {
                id: artifact.id.clone(),
                popularity: artifact.popularity,
            });
        }
        if !dimensions.contains(artifact.coordinates) {
            return Err(CatalogViolation::OutOfBounds {
                id: artifact.id.clone(),
                x: artifact.coordinates.x,
                y: artifact.coordinates.y,
                width: dimensions.width(),
                height: dimensions.height(),
            });
        }
        if let Some(first) = occupied.insert(artifact.coordinates, artifact.id.as_str()) {
            return Err(CatalogViolation::CoordinateCollision {
                first: first.to_string(),
                second: artifact.id.clone(),
                x: artifact.coordinates.x,
                y: artifact.coordinates.y,
            });
        }
    }
    Ok(())
}

/// First 16 hex chars of SHA-256 over the JSON encoding of `artifacts`.
pub fn fingerprint(artifacts: &[Artifact]) -> VitrineResult<String> {
    let encoded = serde_json::to_vec(artifacts)?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    let digest = format!("{:x}", hasher.finalize());
    Ok(digest[..16].to_string())
}
