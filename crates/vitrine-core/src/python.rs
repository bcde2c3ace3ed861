//! Python bindings for the museum service.
//!
//! Results cross the boundary as JSON-shaped Python objects (dicts and
//! lists), decoded with the standard `json` module.

use parking_lot::Mutex;
use pyo3::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::admin::AdminConsole;
use crate::config::MuseumConfig;
use crate::errors::{VitrineError, VitrineResult};
use crate::models::{Artifact, Coordinates};
use crate::query::feed::ALL_CATEGORIES;
use crate::query::proximity::DEFAULT_NEARBY_RADIUS;
use crate::query::recommend::DEFAULT_RECOMMENDATION_LIMIT;
use crate::service::MuseumService;
use crate::session::{Role, VisitorSession};

const SIGN_IN_REQUIRED: &str = "Sign in required";

fn to_py<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let json_str = serde_json::to_string(value).map_err(VitrineError::from)?;
    let json_module = py.import("json")?;
    json_module
        .call_method1("loads", (json_str,))
        .map(|o| o.into())
}

fn from_py<T: DeserializeOwned>(py: Python<'_>, value: &Bound<'_, PyAny>) -> PyResult<T> {
    let json_module = py.import("json")?;
    let json_str: String = json_module.call_method1("dumps", (value,))?.extract()?;
    Ok(serde_json::from_str(&json_str).map_err(VitrineError::from)?)
}

#[pyclass(frozen)]
pub struct MuseumCore {
    service: MuseumService,
    session: Mutex<Option<VisitorSession>>,
}

impl MuseumCore {
    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut VisitorSession) -> VitrineResult<T>,
    ) -> VitrineResult<T> {
        let mut guard = self.session.lock();
        let session = guard
            .as_mut()
            .ok_or_else(|| VitrineError::AccessDenied(SIGN_IN_REQUIRED.to_string()))?;
        f(session)
    }

    fn admin_call<T>(
        &self,
        f: impl FnOnce(&AdminConsole<'_>) -> VitrineResult<T>,
    ) -> VitrineResult<T> {
        self.with_session(|session| f(&self.service.admin(session)?))
    }
}

#[pymethods]
impl MuseumCore {
    /// Configuration comes from `VITRINE_*` variables; `catalog_path`
    /// overrides `VITRINE_CATALOG_PATH`.
    #[new]
    #[pyo3(signature = (catalog_path=None))]
    fn new(catalog_path: Option<String>) -> PyResult<Self> {
        let mut config = MuseumConfig::from_env()?;
        if let Some(path) = catalog_path {
            config.catalog_path = Some(path.into());
        }
        Ok(Self {
            service: MuseumService::from_config(config)?,
            session: Mutex::new(None),
        })
    }

    fn version(&self) -> String {
        self.service.snapshot().version().to_string()
    }

    fn artifact(&self, py: Python<'_>, id: &str) -> PyResult<Option<PyObject>> {
        self.service
            .artifact(id)
            .map(|artifact| to_py(py, &artifact))
            .transpose()
    }

    fn artifacts(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.service.artifacts())
    }

    fn grid(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.service.grid())
    }

    #[pyo3(signature = (x, y, radius=DEFAULT_NEARBY_RADIUS))]
    fn nearby(&self, py: Python<'_>, x: i64, y: i64, radius: u32) -> PyResult<PyObject> {
        to_py(py, &self.service.nearby(x, y, radius))
    }

    #[pyo3(signature = (id, radius=DEFAULT_NEARBY_RADIUS))]
    fn nearby_artifact(&self, py: Python<'_>, id: &str, radius: u32) -> PyResult<PyObject> {
        to_py(py, &self.service.nearby_artifact(id, radius)?)
    }

    #[pyo3(signature = (id, history=vec![], limit=DEFAULT_RECOMMENDATION_LIMIT))]
    fn recommend(
        &self,
        py: Python<'_>,
        id: &str,
        history: Vec<String>,
        limit: usize,
    ) -> PyResult<PyObject> {
        to_py(py, &self.service.recommend_traced(id, &history, limit)?)
    }

    fn home_feed(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.service.home_feed())
    }

    #[pyo3(signature = (query="", category=ALL_CATEGORIES))]
    fn search(&self, py: Python<'_>, query: &str, category: &str) -> PyResult<PyObject> {
        to_py(py, &self.service.search(query, category))
    }

    fn stats(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.service.stats())
    }

    fn planner_stats(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.service.planner_stats())
    }

    // -- session -------------------------------------------------------------

    #[pyo3(signature = (user_id, email, admin=false))]
    fn sign_in(
        &self,
        py: Python<'_>,
        user_id: &str,
        email: &str,
        admin: bool,
    ) -> PyResult<PyObject> {
        let role = if admin { Role::Admin } else { Role::Visitor };
        let session = self.service.open_session(user_id, email, role);
        let rendered = to_py(py, &session)?;
        *self.session.lock() = Some(session);
        Ok(rendered)
    }

    fn sign_out(&self) {
        *self.session.lock() = None;
    }

    fn session(&self, py: Python<'_>) -> PyResult<Option<PyObject>> {
        self.session
            .lock()
            .as_ref()
            .map(|session| to_py(py, session))
            .transpose()
    }

    /// Detail page; records the view when someone is signed in.
    fn view_artifact(&self, py: Python<'_>, id: &str) -> PyResult<PyObject> {
        let mut guard = self.session.lock();
        let detail = self.service.view_artifact(id, guard.as_mut())?;
        drop(guard);
        to_py(py, &detail)
    }

    fn toggle_favorite(&self, id: &str) -> PyResult<bool> {
        Ok(self.with_session(|session| self.service.toggle_favorite(session, id))?)
    }

    fn favorites(&self, py: Python<'_>) -> PyResult<PyObject> {
        let favorites = self.with_session(|session| Ok(self.service.favorites(session)))?;
        to_py(py, &favorites)
    }

    fn history(&self, py: Python<'_>) -> PyResult<PyObject> {
        let history = self.with_session(|session| Ok(self.service.history(session)))?;
        to_py(py, &history)
    }

    // -- back office -----------------------------------------------------------

    fn add_artifact(&self, py: Python<'_>, artifact: &Bound<'_, PyAny>) -> PyResult<String> {
        let artifact: Artifact = from_py(py, artifact)?;
        let snapshot = self.admin_call(|console| console.add_artifact(artifact))?;
        Ok(snapshot.version().to_string())
    }

    fn update_artifact(&self, py: Python<'_>, artifact: &Bound<'_, PyAny>) -> PyResult<String> {
        let artifact: Artifact = from_py(py, artifact)?;
        let snapshot = self.admin_call(|console| console.update_artifact(artifact))?;
        Ok(snapshot.version().to_string())
    }

    fn remove_artifact(&self, id: &str) -> PyResult<String> {
        let snapshot = self.admin_call(|console| console.remove_artifact(id))?;
        Ok(snapshot.version().to_string())
    }

    fn relocate_artifact(&self, id: &str, x: i64, y: i64) -> PyResult<String> {
        let snapshot =
            self.admin_call(|console| console.relocate_artifact(id, Coordinates::new(x, y)))?;
        Ok(snapshot.version().to_string())
    }

    fn replace_catalog(&self, py: Python<'_>, artifacts: &Bound<'_, PyAny>) -> PyResult<String> {
        let artifacts: Vec<Artifact> = from_py(py, artifacts)?;
        let snapshot = self.admin_call(|console| console.replace_catalog(artifacts))?;
        Ok(snapshot.version().to_string())
    }

    fn admin_search(&self, py: Python<'_>, query: &str) -> PyResult<PyObject> {
        let found = self.admin_call(|console| Ok(console.search(query)))?;
        to_py(py, &found)
    }

    fn admin_stats(&self, py: Python<'_>) -> PyResult<PyObject> {
        let stats = self.admin_call(|console| Ok(console.stats()))?;
        to_py(py, &stats)
    }
}
