//! Facade consumed by the presentation layer.
//!
//! Each call works against one catalog snapshot taken at the start of the
//! call, so a concurrent admin edit cannot change the catalog halfway
//! through a query.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::admin::AdminConsole;
use crate::catalog::{
    ArtifactRepository, CatalogFormat, CatalogSource, JsonFileSource, ReferenceSource,
};
use crate::config::MuseumConfig;
use crate::errors::{VitrineError, VitrineResult};
use crate::models::{Artifact, ArtifactId, MuseumGrid};
use crate::query::feed::{self, CatalogStats, HomeFeed, FEED_SECTION_LIMIT};
use crate::query::guards::{clamp_limit, clamp_radius, MAX_RECOMMENDATION_LIMIT};
use crate::query::planner::{CacheMode, PlannerStats, QueryPlanner, QueryTrace};
use crate::query::proximity;
use crate::query::recommend::{rank_recommendations, DEFAULT_RECOMMENDATION_LIMIT};
use crate::session::{Role, VisitorSession};
use crate::store::database::CatalogDatabase;
use crate::store::snapshot::{CatalogSnapshot, CatalogStore};

/// Nearby artifacts shown on the detail page.
pub const NEARBY_PREVIEW_LIMIT: usize = 3;

/// Everything the artifact detail page shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDetail {
    pub artifact: Artifact,
    pub nearby: Vec<Artifact>,
    pub recommendations: Vec<Artifact>,
    pub is_favorite: bool,
}

/// Ranked recommendations plus how the planner served them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub artifacts: Vec<Artifact>,
    pub mode: CacheMode,
    pub trace: QueryTrace,
}

pub struct MuseumService {
    config: MuseumConfig,
    store: CatalogStore,
    database: Option<CatalogDatabase>,
    planner: QueryPlanner<Vec<ArtifactId>>,
}

fn resolve(snapshot: &CatalogSnapshot, ids: &[ArtifactId]) -> Vec<Artifact> {
    ids.iter()
        .filter_map(|id| snapshot.get_by_id(id).cloned())
        .collect()
}

impl MuseumService {
    pub fn new(config: MuseumConfig, source: &dyn CatalogSource) -> VitrineResult<Self> {
        let store = CatalogStore::load(source, config.grid)?;
        Ok(Self::assemble(config, store, None))
    }

    /// Load from `database` and write admin edits back to it.
    pub fn with_database(config: MuseumConfig, database: CatalogDatabase) -> VitrineResult<Self> {
        let store = CatalogStore::load(&database, config.grid)?;
        Ok(Self::assemble(config, store, Some(database)))
    }

    /// The built-in reference collection on the default floor plan.
    pub fn reference() -> VitrineResult<Self> {
        Self::new(MuseumConfig::default(), &ReferenceSource)
    }

    /// Pick the catalog source named by `config.catalog_path`, falling back
    /// to the reference collection.
    pub fn from_config(config: MuseumConfig) -> VitrineResult<Self> {
        let Some(path) = config.catalog_path.clone() else {
            return Self::new(config, &ReferenceSource);
        };
        match CatalogFormat::for_path(&path)? {
            CatalogFormat::Json => Self::new(config, &JsonFileSource::new(path)),
            CatalogFormat::Sqlite => Self::with_database(config, CatalogDatabase::new(path)?),
        }
    }

    fn assemble(
        config: MuseumConfig,
        store: CatalogStore,
        database: Option<CatalogDatabase>,
    ) -> Self {
        let planner = QueryPlanner::new(config.cache_max_entries, config.cache_ttl_seconds);
        info!(
            "Museum service ready: {}x{} floor, write-through {}",
            config.grid.width(),
            config.grid.height(),
            if database.is_some() { "on" } else { "off" }
        );
        Self {
            config,
            store,
            database,
            planner,
        }
    }

    pub fn config(&self) -> &MuseumConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.store.snapshot()
    }

    pub fn planner_stats(&self) -> PlannerStats {
        self.planner.stats()
    }

    /// A fresh session using the configured history capacity.
    pub fn open_session(
        &self,
        user_id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> VisitorSession {
        VisitorSession::new(user_id, email, role).with_history_capacity(self.config.history_capacity)
    }

    // ---- catalog ---------------------------------------------------------

    pub fn artifact(&self, id: &str) -> Option<Artifact> {
        self.snapshot().get_by_id(id).cloned()
    }

    pub fn artifacts(&self) -> Vec<Artifact> {
        self.snapshot().catalog().to_vec()
    }

    pub fn grid(&self) -> MuseumGrid {
        self.snapshot().grid().clone()
    }

    // ---- proximity -------------------------------------------------------

    pub fn nearby(&self, x: i64, y: i64, radius: u32) -> Vec<Artifact> {
        let snapshot = self.snapshot();
        proximity::nearby(&*snapshot, x, y, clamp_radius(radius))
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn nearby_artifact(&self, id: &str, radius: u32) -> VitrineResult<Vec<Artifact>> {
        let snapshot = self.snapshot();
        let artifact = snapshot
            .get_by_id(id)
            .ok_or_else(|| VitrineError::NotFound(id.to_string()))?;
        Ok(proximity::nearby_artifact(&*snapshot, artifact, clamp_radius(radius))
            .into_iter()
            .cloned()
            .collect())
    }

    // ---- recommendations -------------------------------------------------

    pub fn recommend<S: AsRef<str>>(
        &self,
        id: &str,
        history: &[S],
        limit: usize,
    ) -> VitrineResult<Vec<Artifact>> {
        Ok(self.recommend_traced(id, history, limit)?.artifacts)
    }

    /// [`Self::recommend`] with cache diagnostics. Results are cached per
    /// catalog version, so an admin edit never serves stale rankings.
    pub fn recommend_traced<S: AsRef<str>>(
        &self,
        id: &str,
        history: &[S],
        limit: usize,
    ) -> VitrineResult<RecommendationResult> {
        let snapshot = self.snapshot();
        let reference = snapshot
            .get_by_id(id)
            .ok_or_else(|| VitrineError::NotFound(id.to_string()))?;
        let limit = clamp_limit(limit, MAX_RECOMMENDATION_LIMIT);
        let history: Vec<&str> = history.iter().map(AsRef::as_ref).collect();
        let payload = json!({ "id": id, "history": history, "limit": limit });

        let (ids, mode, trace) =
            self.planner
                .get_or_compute("recommend", &payload, Some(snapshot.version()), || {
                    Ok(rank_recommendations(reference, &history, &*snapshot, limit)
                        .into_iter()
                        .map(|rec| rec.artifact.id.clone())
                        .collect())
                })?;
        Ok(RecommendationResult {
            artifacts: resolve(&snapshot, &ids),
            mode,
            trace,
        })
    }

    // ---- feed and search -------------------------------------------------

    pub fn home_feed(&self) -> HomeFeed {
        feed::home_feed(&*self.snapshot(), FEED_SECTION_LIMIT)
    }

    pub fn search(&self, query: &str, category: &str) -> Vec<Artifact> {
        let snapshot = self.snapshot();
        feed::search(&*snapshot, query, category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        feed::catalog_stats(&*self.snapshot())
    }

    // ---- visitor ---------------------------------------------------------

    /// Build the detail page for `id`. Recommendations are ranked against
    /// the history as it was before this view; the view is then recorded
    /// for signed-in visitors.
    pub fn view_artifact(
        &self,
        id: &str,
        session: Option<&mut VisitorSession>,
    ) -> VitrineResult<ArtifactDetail> {
        let snapshot = self.snapshot();
        let artifact = snapshot
            .get_by_id(id)
            .ok_or_else(|| VitrineError::NotFound(id.to_string()))?
            .clone();
        let nearby = proximity::nearby_artifact(
            &*snapshot,
            &artifact,
            proximity::DEFAULT_NEARBY_RADIUS,
        )
        .into_iter()
        .take(NEARBY_PREVIEW_LIMIT)
        .cloned()
        .collect();

        let no_history: &[ArtifactId] = &[];
        let history = session.as_deref().map_or(no_history, VisitorSession::history);
        let recommendations = self.recommend(id, history, DEFAULT_RECOMMENDATION_LIMIT)?;
        let is_favorite = session.as_deref().is_some_and(|s| s.is_favorite(id));

        if let Some(session) = session {
            session.record_view(id);
            debug!("Visitor {} viewed artifact {id}", session.user_id());
        }
        Ok(ArtifactDetail {
            artifact,
            nearby,
            recommendations,
            is_favorite,
        })
    }

    /// Returns the new favorite state. Unknown ids are `NotFound`.
    pub fn toggle_favorite(&self, session: &mut VisitorSession, id: &str) -> VitrineResult<bool> {
        if !self.snapshot().catalog().contains(id) {
            return Err(VitrineError::NotFound(id.to_string()));
        }
        Ok(session.toggle_favorite(id))
    }

    pub fn favorites(&self, session: &VisitorSession) -> Vec<Artifact> {
        let snapshot = self.snapshot();
        session
            .favorite_artifacts(&*snapshot)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn history(&self, session: &VisitorSession) -> Vec<Artifact> {
        let snapshot = self.snapshot();
        session
            .history_artifacts(&*snapshot)
            .into_iter()
            .cloned()
            .collect()
    }

    // ---- back office -----------------------------------------------------

    pub fn admin(&self, session: &VisitorSession) -> VitrineResult<AdminConsole<'_>> {
        Ok(AdminConsole::new(&self.store, session)?.with_database(self.database.as_ref()))
    }
}
