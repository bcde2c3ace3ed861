//! Per-visitor state: favorites, viewing history and role.
//!
//! A session is owned by whoever authenticated the visitor and is passed
//! explicitly to the operations that read or update it.

use serde::{Deserialize, Serialize};

use crate::catalog::ArtifactRepository;
use crate::models::{Artifact, ArtifactId};

/// Most-recent-first history entries kept per visitor.
pub const HISTORY_CAPACITY: usize = 50;

const FALLBACK_DISPLAY_NAME: &str = "Explorer";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Visitor,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSession {
    user_id: String,
    email: String,
    display_name: String,
    role: Role,
    favorites: Vec<ArtifactId>,
    history: Vec<ArtifactId>,
    history_capacity: usize,
}

fn display_name_for(email: &str) -> String {
    match email.split('@').next() {
        Some(local) if !local.trim().is_empty() => local.trim().to_string(),
        _ => FALLBACK_DISPLAY_NAME.to_string(),
    }
}

impl VisitorSession {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        let email = email.into();
        Self {
            user_id: user_id.into(),
            display_name: display_name_for(&email),
            email,
            role,
            favorites: Vec::new(),
            history: Vec::new(),
            history_capacity: HISTORY_CAPACITY,
        }
    }

    /// Cap the history at `capacity` entries (at least one), dropping the
    /// oldest views if it is already longer.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self.history.truncate(self.history_capacity);
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Favorite ids in the order they were added.
    pub fn favorites(&self) -> &[ArtifactId] {
        &self.favorites
    }

    /// Viewed ids, most recent first.
    pub fn history(&self) -> &[ArtifactId] {
        &self.history
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    pub fn is_favorite(&self, artifact_id: &str) -> bool {
        self.favorites.iter().any(|id| id == artifact_id)
    }

    /// Returns `false` if it was already a favorite.
    pub fn add_favorite(&mut self, artifact_id: &str) -> bool {
        if self.is_favorite(artifact_id) {
            return false;
        }
        self.favorites.push(artifact_id.to_string());
        true
    }

    /// Returns `false` if it was not a favorite.
    pub fn remove_favorite(&mut self, artifact_id: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|id| id != artifact_id);
        self.favorites.len() != before
    }

    /// Flip the favorite flag and return the new state.
    pub fn toggle_favorite(&mut self, artifact_id: &str) -> bool {
        if self.remove_favorite(artifact_id) {
            false
        } else {
            self.add_favorite(artifact_id)
        }
    }

    /// Put a first-time view at the front of the history. A repeat view
    /// leaves the order alone.
    pub fn record_view(&mut self, artifact_id: &str) {
        if self.history.iter().any(|id| id == artifact_id) {
            return;
        }
        self.history.insert(0, artifact_id.to_string());
        self.history.truncate(self.history_capacity);
    }

    /// Favorites that still exist in `catalog`, in catalog order.
    pub fn favorite_artifacts<'a, C>(&self, catalog: &'a C) -> Vec<&'a Artifact>
    where
        C: ArtifactRepository + ?Sized,
    {
        resolve_in_catalog_order(catalog, &self.favorites)
    }

    /// Viewed artifacts that still exist in `catalog`, in catalog order.
    pub fn history_artifacts<'a, C>(&self, catalog: &'a C) -> Vec<&'a Artifact>
    where
        C: ArtifactRepository + ?Sized,
    {
        resolve_in_catalog_order(catalog, &self.history)
    }
}

fn resolve_in_catalog_order<'a, C>(catalog: &'a C, ids: &[ArtifactId]) -> Vec<&'a Artifact>
where
    C: ArtifactRepository + ?Sized,
{
    catalog
        .artifacts()
        .iter()
        .filter(|artifact| ids.contains(&artifact.id))
        .collect()
}
