//! Error types for the Vitrine core library.

#[cfg(feature = "python")]
use pyo3::exceptions::{PyIOError, PyPermissionError, PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;

/// A single reason a catalog was rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogViolation {
    #[error("artifact at position {position} has an empty id")]
    EmptyId { position: usize },

    #[error("duplicate artifact id '{id}'")]
    DuplicateId { id: String },

    #[error("artifact '{id}' at ({x}, {y}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        id: String,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
    },

    #[error("artifact '{id}' has popularity {popularity}, expected 0..=100")]
    PopularityOutOfRange { id: String, popularity: i64 },

    #[error("artifacts '{first}' and '{second}' both occupy ({x}, {y})")]
    CoordinateCollision {
        first: String,
        second: String,
        x: i64,
        y: i64,
    },
}

/// Top-level error enum for the Vitrine core library.
#[derive(Debug, thiserror::Error)]
pub enum VitrineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(#[from] CatalogViolation),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<VitrineError> for PyErr {
    fn from(err: VitrineError) -> PyErr {
        match &err {
            VitrineError::InvalidConfiguration(_)
            | VitrineError::InvalidCatalog(_)
            | VitrineError::NotFound(_)
            | VitrineError::Json(_) => PyValueError::new_err(err.to_string()),
            VitrineError::AccessDenied(_) => PyPermissionError::new_err(err.to_string()),
            VitrineError::Database(_) | VitrineError::Sqlite(_) => {
                PyRuntimeError::new_err(err.to_string())
            }
            VitrineError::Io(_) => PyIOError::new_err(err.to_string()),
        }
    }
}

pub type VitrineResult<T> = Result<T, VitrineError>;
