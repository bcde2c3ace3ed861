//! Atomically swappable catalog snapshots.
//!
//! Readers take an `Arc` to the current snapshot and keep using it for as
//! long as they like; writers build a complete replacement (catalog, grid,
//! version) off to the side and swap the pointer. A reader therefore sees
//! either the old catalog or the new one, never a mix.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::catalog::{ArtifactRepository, Catalog, CatalogSource};
use crate::errors::VitrineResult;
use crate::models::{Artifact, GridDimensions, MuseumGrid};
use crate::query::grid::build_grid_with;

/// One immutable version of the catalog and everything derived from it.
#[derive(Debug)]
pub struct CatalogSnapshot {
    catalog: Catalog,
    grid: MuseumGrid,
}

impl CatalogSnapshot {
    pub fn build(artifacts: Vec<Artifact>, dimensions: GridDimensions) -> VitrineResult<Self> {
        let catalog = Catalog::new(artifacts, dimensions)?;
        let grid = build_grid_with(&catalog, dimensions);
        Ok(Self { catalog, grid })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn grid(&self) -> &MuseumGrid {
        &self.grid
    }

    /// Content fingerprint of the catalog this snapshot was built from.
    pub fn version(&self) -> &str {
        self.catalog.fingerprint()
    }
}

impl ArtifactRepository for CatalogSnapshot {
    fn artifacts(&self) -> &[Artifact] {
        self.catalog.artifacts()
    }

    fn get_by_id(&self, id: &str) -> Option<&Artifact> {
        self.catalog.get_by_id(id)
    }
}

pub struct CatalogStore {
    dimensions: GridDimensions,
    current: RwLock<Arc<CatalogSnapshot>>,
    writer: Mutex<()>,
}

impl CatalogStore {
    pub fn new(artifacts: Vec<Artifact>, dimensions: GridDimensions) -> VitrineResult<Self> {
        let snapshot = CatalogSnapshot::build(artifacts, dimensions)?;
        Ok(Self {
            dimensions,
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        })
    }

    /// Load and validate the catalog from `source`.
    pub fn load(source: &dyn CatalogSource, dimensions: GridDimensions) -> VitrineResult<Self> {
        let artifacts = source.load()?;
        let store = Self::new(artifacts, dimensions).inspect_err(|e| {
            warn!("Rejected catalog from {}: {e}", source.describe());
        })?;
        let snapshot = store.snapshot();
        info!(
            "Loaded {} artifacts from {} (version {})",
            snapshot.catalog().len(),
            source.describe(),
            snapshot.version()
        );
        Ok(store)
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&*self.current.read())
    }

    /// Swap in a whole new catalog. `persist` runs before the swap; if it
    /// or validation fails the current snapshot stays in place.
    pub fn replace<P>(
        &self,
        artifacts: Vec<Artifact>,
        persist: P,
    ) -> VitrineResult<Arc<CatalogSnapshot>>
    where
        P: FnOnce(&CatalogSnapshot) -> VitrineResult<()>,
    {
        self.modify(
            |current| {
                *current = artifacts;
                Ok(())
            },
            |next, ()| persist(next),
        )
        .map(|(snapshot, ())| snapshot)
    }

    /// Copy-on-write edit: `edit` receives a copy of the current records,
    /// and the result is validated, handed to `persist`, then swapped in.
    /// A failure at any step leaves the current snapshot in place. Edits
    /// and their `persist` calls run one at a time under the writer lock.
    pub fn modify<F, P, T>(
        &self,
        edit: F,
        persist: P,
    ) -> VitrineResult<(Arc<CatalogSnapshot>, T)>
    where
        F: FnOnce(&mut Vec<Artifact>) -> VitrineResult<T>,
        P: FnOnce(&CatalogSnapshot, &T) -> VitrineResult<()>,
    {
        let _writer = self.writer.lock();
        let base = self.snapshot();
        let mut working = base.catalog().to_vec();
        let outcome = edit(&mut working)?;
        let next = CatalogSnapshot::build(working, self.dimensions).inspect_err(|e| {
            warn!("Rejected catalog edit on version {}: {e}", base.version());
        })?;
        persist(&next, &outcome).inspect_err(|e| {
            warn!("Catalog edit on version {} not persisted: {e}", base.version());
        })?;
        let next = Arc::new(next);
        *self.current.write() = Arc::clone(&next);
        info!(
            "Catalog version {} -> {} ({} artifacts)",
            base.version(),
            next.version(),
            next.catalog().len()
        );
        Ok((next, outcome))
    }
}
