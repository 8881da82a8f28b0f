//! SQLite schema migrations.
//!
//! Migrations are an ordered table of SQL batches. Migration `n` moves the
//! schema from version `n - 1` to `n`; applied versions are recorded in
//! `schema_migrations`.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{LedgerError, Result};

/// One schema step.
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "ledger_state",
    // TEXT keys compare with BINARY collation, i.e. byte-wise UTF-8 order,
    // which is the order range scans must follow.
    sql: "CREATE TABLE ledger_state (
              key TEXT PRIMARY KEY NOT NULL,
              value BLOB NOT NULL,
              written_at INTEGER NOT NULL
          );",
}];

/// Schema version this build writes.
pub const CURRENT_VERSION: u32 = 1;

/// Version recorded in the database, or 0 for a fresh file.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    let has_table: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if has_table.is_none() {
        return Ok(0);
    }
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Bring the schema up to [`CURRENT_VERSION`]. Safe to call repeatedly.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let found = schema_version(conn)?;
    if found > CURRENT_VERSION {
        return Err(LedgerError::Migration(format!(
            "database is at schema version {found}, this build supports up to {CURRENT_VERSION}"
        )));
    }

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > found).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL
         );",
    )?;
    for migration in pending {
        tx.execute_batch(migration.sql).map_err(|e| {
            LedgerError::Migration(format!(
                "migration {} ({}) failed: {}",
                migration.version, migration.name, e
            ))
        })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![migration.version, now_millis()],
        )?;
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "applied ledger migration"
        );
    }
    tx.commit()?;
    Ok(())
}

/// Wall-clock time in Unix milliseconds, for `written_at` stamps.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
