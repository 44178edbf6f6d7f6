//! Cache schema migrations.
//!
//! Each step runs in its own transaction together with its bookkeeping row,
//! so a failed step leaves the schema at the previous version.

use tokio_rusqlite::{Connection, params, rusqlite};

use super::Error;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "grants_cache", sql: include_str!("../../migrations/001_grants_cache.sql") },
    Migration { version: 2, name: "popular_open", sql: include_str!("../../migrations/002_popular_open.sql") },
    Migration {
        version: 3,
        name: "contact_messages",
        sql: include_str!("../../migrations/003_contact_messages.sql"),
    },
];

fn schema_version(conn: &rusqlite::Connection) -> Result<i64, Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )?;

    Ok(conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| row.get(0))?)
}

/// Bring the cache schema up to the latest version.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let current = schema_version(conn)?;

        for step in MIGRATIONS.iter().filter(|m| m.version > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(step.sql)
                .map_err(|e| Error::MigrationFailed(format!("{} (v{}): {e}", step.name, step.version)))?;
            tx.execute(
                "INSERT INTO schema_version (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![step.version, step.name, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::debug!(version = step.version, name = step.name, "applied cache migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
