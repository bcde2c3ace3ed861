//! Pluggable catalog sources.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::reference::reference_artifacts;
use crate::errors::{VitrineError, VitrineResult};
use crate::models::Artifact;
use crate::store::database::CatalogDatabase;

/// Something that can produce the raw artifact records for a catalog.
///
/// Sources do not validate; [`crate::catalog::Catalog::new`] does that once
/// the records are loaded.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> VitrineResult<Vec<Artifact>>;

    /// Human-readable origin used in log lines.
    fn describe(&self) -> String;
}

/// The built-in reference collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceSource;

impl CatalogSource for ReferenceSource {
    fn load(&self) -> VitrineResult<Vec<Artifact>> {
        Ok(reference_artifacts())
    }

    fn describe(&self) -> String {
        "reference".to_string()
    }
}

/// A JSON array of camelCase artifact records on disk.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `artifacts` in the format [`JsonFileSource::load`] reads.
    pub fn save(&self, artifacts: &[Artifact]) -> VitrineResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let encoded = serde_json::to_string_pretty(artifacts)?;
        std::fs::write(&self.path, encoded)?;
        Ok(())
    }
}

impl CatalogSource for JsonFileSource {
    fn load(&self) -> VitrineResult<Vec<Artifact>> {
        let raw = std::fs::read_to_string(&self.path)?;
        let artifacts: Vec<Artifact> = serde_json::from_str(&raw)?;
        debug!(
            "Read {} artifact records from {}",
            artifacts.len(),
            self.path.display()
        );
        Ok(artifacts)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// On-disk catalog formats, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Sqlite,
}

impl CatalogFormat {
    /// `.json`, or an SQLite database (`.db`, `.sqlite`, `.sqlite3`).
    pub fn for_path(path: &Path) -> VitrineResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("db") | Some("sqlite") | Some("sqlite3") => Ok(Self::Sqlite),
            _ => Err(VitrineError::InvalidConfiguration(format!(
                "unsupported catalog file '{}': expected .json, .db, .sqlite or .sqlite3",
                path.display()
            ))),
        }
    }
}

pub fn source_for_path(path: &Path) -> VitrineResult<Box<dyn CatalogSource>> {
    match CatalogFormat::for_path(path)? {
        CatalogFormat::Json => Ok(Box::new(JsonFileSource::new(path))),
        CatalogFormat::Sqlite => Ok(Box::new(CatalogDatabase::new(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_source_loads_eight() {
        let artifacts = ReferenceSource.load().unwrap();
        assert_eq!(artifacts.len(), 8);
        assert_eq!(ReferenceSource.describe(), "reference");
    }

    #[test]
    fn test_json_source_round_trips_reference() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("nested").join("catalog.json"));
        source.save(&reference_artifacts()).unwrap();
        let loaded = source.load().unwrap();
        assert_eq!(loaded, reference_artifacts());
    }

    #[test]
    fn test_json_source_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("absent.json"));
        assert!(matches!(source.load(), Err(VitrineError::Io(_))));
    }

    #[test]
    fn test_json_source_malformed_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[{\"id\": 1}]").unwrap();
        let source = JsonFileSource::new(&path);
        assert!(matches!(source.load(), Err(VitrineError::Json(_))));
    }

    #[test]
    fn test_source_for_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = source_for_path(&dir.path().join("c.json")).unwrap();
        assert!(json.describe().starts_with("json:"));
        let db = source_for_path(&dir.path().join("c.sqlite")).unwrap();
        assert!(db.describe().starts_with("sqlite:"));
        assert!(matches!(
            source_for_path(&dir.path().join("c.csv")),
            Err(VitrineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_catalog_format_is_case_insensitive() {
        assert_eq!(
            CatalogFormat::for_path(Path::new("museum.SQLite3")).unwrap(),
            CatalogFormat::Sqlite
        );
        assert_eq!(
            CatalogFormat::for_path(Path::new("museum.Json")).unwrap(),
            CatalogFormat::Json
        );
        assert!(CatalogFormat::for_path(Path::new("museum")).is_err());
    }
}
