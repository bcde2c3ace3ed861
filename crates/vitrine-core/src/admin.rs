//! Role-gated catalog management.
//!
//! Every edit goes through [`CatalogStore::modify`], so the new catalog is
//! validated as a whole and swapped in atomically. When a database is
//! attached the edit is written through first; a failed write leaves the
//! in-memory catalog untouched.

use std::sync::Arc;

use tracing::info;

use crate::catalog::ArtifactRepository;
use crate::errors::{CatalogViolation, VitrineError, VitrineResult};
use crate::models::{Artifact, Coordinates};
use crate::query::feed::{catalog_stats, search_by_name, CatalogStats};
use crate::session::VisitorSession;
use crate::store::database::CatalogDatabase;
use crate::store::snapshot::{CatalogSnapshot, CatalogStore};

pub const ADMIN_REQUIRED: &str = "Admin privileges required";

pub struct AdminConsole<'a> {
    store: &'a CatalogStore,
    database: Option<&'a CatalogDatabase>,
    actor: String,
}

fn position_of(artifacts: &[Artifact], id: &str) -> VitrineResult<usize> {
    artifacts
        .iter()
        .position(|artifact| artifact.id == id)
        .ok_or_else(|| VitrineError::NotFound(id.to_string()))
}

impl<'a> AdminConsole<'a> {
    /// Fails with `AccessDenied` unless `session` belongs to an admin.
    pub fn new(store: &'a CatalogStore, session: &VisitorSession) -> VitrineResult<Self> {
        if !session.is_admin() {
            return Err(VitrineError::AccessDenied(ADMIN_REQUIRED.to_string()));
        }
        Ok(Self {
            store,
            database: None,
            actor: session.user_id().to_string(),
        })
    }

    pub fn with_database(mut self, database: Option<&'a CatalogDatabase>) -> Self {
        self.database = database;
        self
    }

    pub fn add_artifact(&self, artifact: Artifact) -> VitrineResult<Arc<CatalogSnapshot>> {
        let id = artifact.id.clone();
        let (snapshot, ()) = self.store.modify(
            |artifacts| {
                if artifacts.iter().any(|existing| existing.id == artifact.id) {
                    return Err(CatalogViolation::DuplicateId {
                        id: artifact.id.clone(),
                    }
                    .into());
                }
                artifacts.push(artifact);
                Ok(())
            },
            |next, ()| self.persist_upsert(next, &id),
        )?;
        info!("Admin {} added artifact {id}", self.actor);
        Ok(snapshot)
    }

    /// Replace the record whose id matches `artifact.id`, keeping its place
    /// in catalog order.
    pub fn update_artifact(&self, artifact: Artifact) -> VitrineResult<Arc<CatalogSnapshot>> {
        let id = artifact.id.clone();
        let (snapshot, ()) = self.store.modify(
            |artifacts| {
                let index = position_of(artifacts, &artifact.id)?;
                artifacts[index] = artifact;
                Ok(())
            },
            |next, ()| self.persist_upsert(next, &id),
        )?;
        info!("Admin {} updated artifact {id}", self.actor);
        Ok(snapshot)
    }

    pub fn remove_artifact(&self, id: &str) -> VitrineResult<Arc<CatalogSnapshot>> {
        let (snapshot, ()) = self.store.modify(
            |artifacts| {
                let index = position_of(artifacts, id)?;
                artifacts.remove(index);
                Ok(())
            },
            |_, ()| self.persist_delete(id),
        )?;
        info!("Admin {} removed artifact {id}", self.actor);
        Ok(snapshot)
    }

    /// Move an artifact to another cell of the floor plan.
    pub fn relocate_artifact(
        &self,
        id: &str,
        coordinates: Coordinates,
    ) -> VitrineResult<Arc<CatalogSnapshot>> {
        let (snapshot, ()) = self.store.modify(
            |artifacts| {
                let index = position_of(artifacts, id)?;
                artifacts[index].coordinates = coordinates;
                Ok(())
            },
            |next, ()| self.persist_upsert(next, id),
        )?;
        info!(
            "Admin {} moved artifact {id} to ({}, {})",
            self.actor, coordinates.x, coordinates.y
        );
        Ok(snapshot)
    }

    pub fn replace_catalog(&self, artifacts: Vec<Artifact>) -> VitrineResult<Arc<CatalogSnapshot>> {
        let snapshot = self.store.replace(artifacts, |next| match self.database {
            Some(database) => database.save_all(next.artifacts()),
            None => Ok(()),
        })?;
        info!(
            "Admin {} replaced the catalog ({} artifacts)",
            self.actor,
            snapshot.catalog().len()
        );
        Ok(snapshot)
    }

    pub fn stats(&self) -> CatalogStats {
        catalog_stats(&*self.store.snapshot())
    }

    /// Name filter for the artifact table.
    pub fn search(&self, query: &str) -> Vec<Artifact> {
        let snapshot = self.store.snapshot();
        search_by_name(&*snapshot, query).into_iter().cloned().collect()
    }

    fn persist_upsert(&self, snapshot: &CatalogSnapshot, id: &str) -> VitrineResult<()> {
        let Some(database) = self.database else {
            return Ok(());
        };
        let artifact = snapshot
            .get_by_id(id)
            .ok_or_else(|| VitrineError::NotFound(id.to_string()))?;
        database.upsert(artifact)
    }

    fn persist_delete(&self, id: &str) -> VitrineResult<()> {
        match self.database {
            Some(database) => database.delete(id).map(|_| ()),
            None => Ok(()),
        }
    }
}
