//! SQLite schema DDL and migration framework for the catalog database.

use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::errors::VitrineResult;

/// Latest schema version; [`migrate_schema`] brings older files up to it.
pub const SCHEMA_VERSION: i32 = 2;

/// Base tables and indexes. Every statement is idempotent.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS catalog_meta (
        key TEXT PRIMARY KEY,
        value TEXT
    );",
    "CREATE TABLE IF NOT EXISTS artifacts (
        id TEXT PRIMARY KEY,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        era TEXT NOT NULL,
        origin TEXT NOT NULL,
        image_url TEXT NOT NULL,
        category TEXT NOT NULL,
        x INTEGER NOT NULL,
        y INTEGER NOT NULL,
        popularity INTEGER NOT NULL DEFAULT 0,
        gallery TEXT,
        date_added TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS artifact_tags (
        artifact_id TEXT NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        tag TEXT NOT NULL,
        PRIMARY KEY(artifact_id, position)
    );",
    "CREATE TABLE IF NOT EXISTS schema_migrations (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        from_version INTEGER NOT NULL,
        to_version INTEGER NOT NULL,
        outcome TEXT NOT NULL,
        detail TEXT,
        applied_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE INDEX IF NOT EXISTS idx_artifacts_position ON artifacts(position);",
    "CREATE INDEX IF NOT EXISTS idx_artifacts_category ON artifacts(category);",
];

type MigrationStep = fn(&Connection) -> VitrineResult<()>;

/// `(target version, step)`, ascending.
const MIGRATIONS: &[(i32, MigrationStep)] = &[(1, baseline), (2, cell_and_tag_indexes)];

// ─── Migration runner ───────────────────────────────────────────────────────

/// Apply every step newer than the stored version, one SAVEPOINT per step.
/// A failing step is rolled back, logged to `schema_migrations` and returned;
/// steps before it stay applied.
pub fn migrate_schema(conn: &Connection) -> VitrineResult<()> {
    let stored = get_schema_version(conn);
    let pending = MIGRATIONS.iter().filter(|(target, _)| *target > stored);

    for &(target, step) in pending {
        let from = target - 1;
        conn.execute_batch("SAVEPOINT vitrine_migrate_step;")?;
        let applied = step(conn)
            .and_then(|()| store_schema_version(conn, target))
            .and_then(|()| log_step(conn, from, target, "applied", None));

        if let Err(e) = applied {
            warn!("Catalog schema step v{from} -> v{target} failed: {e}");
            conn.execute_batch(
                "ROLLBACK TO SAVEPOINT vitrine_migrate_step; \
                 RELEASE SAVEPOINT vitrine_migrate_step;",
            )?;
            log_step(conn, from, target, "failed", Some(&e.to_string()))?;
            return Err(e);
        }
        conn.execute_batch("RELEASE SAVEPOINT vitrine_migrate_step;")?;
        info!("Catalog schema at v{target}");
    }
    Ok(())
}

/// Stored schema version; a missing or garbled entry reads as 0.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT value FROM catalog_meta WHERE key = 'schema_version';",
        [],
        |row| row.get::<_, String>(0),
    )
    .ok()
    .and_then(|raw| raw.parse().ok())
    .unwrap_or(0)
}

fn store_schema_version(conn: &Connection, version: i32) -> VitrineResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO catalog_meta(key, value) VALUES ('schema_version', ?1);",
        params![version.to_string()],
    )?;
    Ok(())
}

fn log_step(
    conn: &Connection,
    from: i32,
    to: i32,
    outcome: &str,
    detail: Option<&str>,
) -> VitrineResult<()> {
    conn.execute(
        "INSERT INTO schema_migrations(from_version, to_version, outcome, detail) \
         VALUES (?1, ?2, ?3, ?4);",
        params![from, to, outcome, detail],
    )?;
    Ok(())
}

// ─── Steps ──────────────────────────────────────────────────────────────────

/// v1 is the base tables themselves.
fn baseline(_conn: &Connection) -> VitrineResult<()> {
    Ok(())
}

/// v2: one artifact per floor cell, plus tag lookup.
fn cell_and_tag_indexes(conn: &Connection) -> VitrineResult<()> {
    conn.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_artifacts_cell ON artifacts(x, y);
         CREATE INDEX IF NOT EXISTS idx_artifact_tags_tag ON artifact_tags(tag);",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_tables() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        for ddl in SCHEMA_STATEMENTS {
            conn.execute_batch(ddl).unwrap();
        }
        conn
    }

    fn applied_steps(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE outcome = 'applied';",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_steps_cover_every_version() {
        let targets: Vec<i32> = MIGRATIONS.iter().map(|(target, _)| *target).collect();
        assert_eq!(targets, (1..=SCHEMA_VERSION).collect::<Vec<_>>());
    }

    #[test]
    fn test_new_file_reaches_latest_version() {
        let conn = with_tables();
        assert_eq!(get_schema_version(&conn), 0);
        migrate_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
        assert_eq!(applied_steps(&conn), SCHEMA_VERSION as i64);
    }

    #[test]
    fn test_rerun_applies_nothing() {
        let conn = with_tables();
        migrate_schema(&conn).unwrap();
        migrate_schema(&conn).unwrap();
        assert_eq!(applied_steps(&conn), SCHEMA_VERSION as i64);
    }

    #[test]
    fn test_partial_version_resumes() {
        let conn = with_tables();
        store_schema_version(&conn, 1).unwrap();
        migrate_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
        assert_eq!(applied_steps(&conn), 1);
    }

    #[test]
    fn test_failed_step_is_rolled_back_and_logged() {
        let conn = with_tables();
        // Two artifacts on one cell make the v2 unique index impossible.
        let insert = "INSERT INTO artifacts(id, position, name, description, era, origin, \
                      image_url, category, x, y, popularity, date_added) \
                      VALUES (?1, ?2, 'n', 'd', 'e', 'o', 'u', 'c', 1, 1, 0, '2024-01-01');";
        conn.execute(insert, params!["a", 0]).unwrap();
        conn.execute(insert, params!["b", 1]).unwrap();

        assert!(migrate_schema(&conn).is_err());
        assert_eq!(get_schema_version(&conn), 1);
        let failed: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM schema_migrations WHERE outcome = 'failed';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(failed, 1);
    }

    #[test]
    fn test_cell_index_rejects_shared_coordinates() {
        let conn = with_tables();
        migrate_schema(&conn).unwrap();
        let insert = "INSERT INTO artifacts(id, position, name, description, era, origin, \
                      image_url, category, x, y, popularity, date_added) \
                      VALUES (?1, ?2, 'n', 'd', 'e', 'o', 'u', 'c', 1, 1, 0, '2024-01-01');";
        conn.execute(insert, params!["a", 0]).unwrap();
        assert!(conn.execute(insert, params!["b", 1]).is_err());
    }
}
