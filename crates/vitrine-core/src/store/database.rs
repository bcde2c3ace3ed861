//! SQLite-backed catalog storage.
//!
//! Every public method opens its own connection so callers never manage
//! connection lifetime.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::catalog::CatalogSource;
use crate::errors::{VitrineError, VitrineResult};
use crate::models::{Artifact, Coordinates};
use crate::store::schema;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            let mut expanded = PathBuf::from(home);
            if path.len() > 2 {
                expanded.push(&path[2..]);
            }
            return expanded;
        }
    }
    PathBuf::from(path)
}

struct ArtifactRow {
    id: String,
    name: String,
    description: String,
    era: String,
    origin: String,
    image_url: String,
    category: String,
    x: i64,
    y: i64,
    popularity: i64,
    gallery: Option<String>,
    date_added: String,
}

impl ArtifactRow {
    fn into_artifact(self, tags: Vec<String>) -> VitrineResult<Artifact> {
        let date_added = NaiveDate::parse_from_str(&self.date_added, DATE_FORMAT).map_err(|e| {
            VitrineError::Database(format!(
                "artifact '{}' has unreadable date_added '{}': {e}",
                self.id, self.date_added
            ))
        })?;
        Ok(Artifact {
            id: self.id,
            name: self.name,
            description: self.description,
            era: self.era,
            origin: self.origin,
            image_url: self.image_url,
            category: self.category,
            coordinates: Coordinates::new(self.x, self.y),
            popularity: self.popularity,
            tags,
            gallery: self.gallery,
            date_added,
        })
    }
}

/// SQLite catalog store.
#[derive(Clone, Debug)]
pub struct CatalogDatabase {
    db_path: PathBuf,
}

impl CatalogDatabase {
    /// The path is expanded and parent directories are created if they do
    /// not already exist.
    pub fn new(db_path: impl AsRef<Path>) -> VitrineResult<Self> {
        let db_str = db_path.as_ref().to_string_lossy();
        let expanded = expand_tilde(&db_str);
        let resolved = if expanded.is_absolute() {
            expanded
        } else {
            std::env::current_dir()?.join(&expanded)
        };
        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { db_path: resolved })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> VitrineResult<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Set WAL mode, create all tables and indexes, then run pending
    /// migrations. Safe to call repeatedly.
    pub fn init_schema(&self) -> VitrineResult<()> {
        let conn = self.connect()?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        for stmt in schema::SCHEMA_STATEMENTS {
            conn.execute_batch(stmt)?;
        }
        schema::migrate_schema(&conn)?;
        Ok(())
    }

    pub fn count(&self) -> VitrineResult<usize> {
        self.init_schema()?;
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM artifacts;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Read every artifact in stored catalog order.
    pub fn load_all(&self) -> VitrineResult<Vec<Artifact>> {
        self.init_schema()?;
        let conn = self.connect()?;

        let mut tag_stmt = conn
            .prepare("SELECT artifact_id, tag FROM artifact_tags ORDER BY artifact_id, position;")?;
        let mut tags: HashMap<String, Vec<String>> = HashMap::new();
        let tag_rows = tag_stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for tag_row in tag_rows {
            let (artifact_id, tag) = tag_row?;
            tags.entry(artifact_id).or_default().push(tag);
        }

        let mut stmt = conn.prepare(
            "SELECT id, name, description, era, origin, image_url, category, x, y, \
             popularity, gallery, date_added FROM artifacts ORDER BY position ASC, id ASC;",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ArtifactRow {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                era: row.get(3)?,
                origin: row.get(4)?,
                image_url: row.get(5)?,
                category: row.get(6)?,
                x: row.get(7)?,
                y: row.get(8)?,
                popularity: row.get(9)?,
                gallery: row.get(10)?,
                date_added: row.get(11)?,
            })
        })?;

        let mut artifacts = Vec::new();
        for row in rows {
            let row = row?;
            let artifact_tags = tags.remove(&row.id).unwrap_or_default();
            artifacts.push(row.into_artifact(artifact_tags)?);
        }
        debug!(
            "Loaded {} artifacts from {}",
            artifacts.len(),
            self.db_path.display()
        );
        Ok(artifacts)
    }

    /// Replace the stored catalog with `artifacts`, in one transaction.
    pub fn save_all(&self, artifacts: &[Artifact]) -> VitrineResult<()> {
        self.init_schema()?;
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM artifact_tags;", [])?;
        tx.execute("DELETE FROM artifacts;", [])?;
        for (position, artifact) in artifacts.iter().enumerate() {
            write_artifact(&tx, artifact, position as i64)?;
        }
        tx.commit()?;
        info!(
            "Saved {} artifacts to {}",
            artifacts.len(),
            self.db_path.display()
        );
        Ok(())
    }

    /// Insert or update one artifact. New artifacts go to the end of the
    /// catalog order; existing ones keep their position.
    pub fn upsert(&self, artifact: &Artifact) -> VitrineResult<()> {
        self.init_schema()?;
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT position FROM artifacts WHERE id = ?1;",
                params![artifact.id],
                |row| row.get(0),
            )
            .optional()?;
        let position = match existing {
            Some(position) => position,
            None => tx.query_row(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM artifacts;",
                [],
                |row| row.get(0),
            )?,
        };
        write_artifact(&tx, artifact, position)?;
        tx.commit()?;
        Ok(())
    }

    /// Remove one artifact and its tags; returns whether a row was deleted.
    pub fn delete(&self, id: &str) -> VitrineResult<bool> {
        self.init_schema()?;
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM artifact_tags WHERE artifact_id = ?1;", params![id])?;
        let removed = tx.execute("DELETE FROM artifacts WHERE id = ?1;", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

fn write_artifact(conn: &Connection, artifact: &Artifact, position: i64) -> VitrineResult<()> {
    conn.execute(
        "INSERT INTO artifacts(id, position, name, description, era, origin, image_url, \
         category, x, y, popularity, gallery, date_added) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) \
         ON CONFLICT(id) DO UPDATE SET \
            position = excluded.position, name = excluded.name, \
            description = excluded.description, era = excluded.era, \
            origin = excluded.origin, image_url = excluded.image_url, \
            category = excluded.category, x = excluded.x, y = excluded.y, \
            popularity = excluded.popularity, gallery = excluded.gallery, \
            date_added = excluded.date_added;",
        params![
            artifact.id,
            position,
            artifact.name,
            artifact.description,
            artifact.era,
            artifact.origin,
            artifact.image_url,
            artifact.category,
            artifact.coordinates.x,
            artifact.coordinates.y,
            artifact.popularity,
            artifact.gallery,
            artifact.date_added.format(DATE_FORMAT).to_string(),
        ],
    )?;
    conn.execute(
        "DELETE FROM artifact_tags WHERE artifact_id = ?1;",
        params![artifact.id],
    )?;
    for (tag_position, tag) in artifact.tags.iter().enumerate() {
        conn.execute(
            "INSERT INTO artifact_tags(artifact_id, position, tag) VALUES (?1, ?2, ?3);",
            params![artifact.id, tag_position as i64, tag],
        )?;
    }
    Ok(())
}

impl CatalogSource for CatalogDatabase {
    fn load(&self) -> VitrineResult<Vec<Artifact>> {
        self.load_all()
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.db_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reference_artifacts;

    fn temp_db() -> (tempfile::TempDir, CatalogDatabase) {
        let dir = tempfile::tempdir().unwrap();
        let db = CatalogDatabase::new(dir.path().join("catalog.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_empty_database_loads_nothing() {
        let (_dir, db) = temp_db();
        assert!(db.load_all().unwrap().is_empty());
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_save_all_preserves_order_and_tags() {
        let (_dir, db) = temp_db();
        let artifacts = reference_artifacts();
        db.save_all(&artifacts).unwrap();
        assert_eq!(db.load_all().unwrap(), artifacts);
    }

    #[test]
    fn test_save_all_replaces_previous_contents() {
        let (_dir, db) = temp_db();
        db.save_all(&reference_artifacts()).unwrap();
        let subset: Vec<Artifact> = reference_artifacts().into_iter().take(2).collect();
        db.save_all(&subset).unwrap();
        assert_eq!(db.load_all().unwrap(), subset);
    }

    #[test]
    fn test_upsert_appends_then_updates_in_place() {
        let (_dir, db) = temp_db();
        let mut artifacts = reference_artifacts();
        db.save_all(&artifacts[..3]).unwrap();

        db.upsert(&artifacts[5]).unwrap();
        let ids: Vec<String> = db.load_all().unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "6"]);

        artifacts[1].popularity = 12;
        artifacts[1].tags = vec!["restored".to_string()];
        db.upsert(&artifacts[1]).unwrap();
        let loaded = db.load_all().unwrap();
        assert_eq!(loaded[1].id, "2");
        assert_eq!(loaded[1].popularity, 12);
        assert_eq!(loaded[1].tags, vec!["restored".to_string()]);
    }

    #[test]
    fn test_delete_reports_removal() {
        let (_dir, db) = temp_db();
        db.save_all(&reference_artifacts()).unwrap();
        assert!(db.delete("4").unwrap());
        assert!(!db.delete("4").unwrap());
        assert_eq!(db.count().unwrap(), 7);
    }

    #[test]
    fn test_failed_delete_keeps_tags() {
        let (_dir, db) = temp_db();
        db.save_all(&reference_artifacts()).unwrap();
        db.connect()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER keep_artifacts BEFORE DELETE ON artifacts \
                 BEGIN SELECT RAISE(ABORT, 'artifacts are locked'); END;",
            )
            .unwrap();
        assert!(db.delete("4").is_err());
        assert_eq!(db.load_all().unwrap(), reference_artifacts());
    }

    #[test]
    fn test_unreadable_date_is_database_error() {
        let (_dir, db) = temp_db();
        db.save_all(&reference_artifacts()[..1]).unwrap();
        let conn = db.connect().unwrap();
        conn.execute("UPDATE artifacts SET date_added = 'soon';", [])
            .unwrap();
        assert!(matches!(db.load_all(), Err(VitrineError::Database(_))));
    }
}
