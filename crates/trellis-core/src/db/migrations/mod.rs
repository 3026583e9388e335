//! Versioned schema upgrades, tracked in `PRAGMA user_version`.
//!
//! `store_meta.schema_version` mirrors the pragma so the version stays
//! visible to plain SQL readers.

use super::schema;
use rusqlite::{Connection, types::Type};

/// Highest version in [`MIGRATIONS`].
pub const LATEST_SCHEMA_VERSION: u32 = 2;

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: schema::MIGRATION_V1_SQL,
    },
    Migration {
        version: 2,
        sql: schema::MIGRATION_V2_SQL,
    },
];

/// The store's recorded schema version; 0 for a fresh database.
///
/// # Errors
///
/// Fails if the pragma query fails or holds a negative value.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let raw: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e)))
}

/// Bring the store up to [`LATEST_SCHEMA_VERSION`] and return the version
/// it ends at.
///
/// # Errors
///
/// Fails on the first migration that cannot be applied. Versions applied
/// before it stay committed.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let from = current_schema_version(conn)?;
    let mut reached = from;
    for step in MIGRATIONS.iter().filter(|m| m.version > from) {
        apply(conn, step)?;
        reached = step.version;
    }
    if reached > from {
        tracing::debug!(from, to = reached, "store schema upgraded");
    }
    Ok(reached)
}

/// One step, its version bump included, in a single transaction.
fn apply(conn: &mut Connection, step: &Migration) -> rusqlite::Result<()> {
    let version = i64::from(step.version);
    let tx = conn.transaction()?;
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", version)?;
    tx.execute("UPDATE store_meta SET schema_version = ?1 WHERE id = 1", [version])?;
    tx.commit()
}
