//! Schema version bookkeeping.
//!
//! The version lives in `schema_meta`. A database written by a newer binary is
//! refused rather than silently misread.

use anyhow::Result;
use rusqlite::Connection;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

/// Fail if the database schema is newer than this binary understands.
pub fn check_schema_version(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, expected = CURRENT_SCHEMA_VERSION, "checking schema version");
    anyhow::ensure!(
        version <= CURRENT_SCHEMA_VERSION,
        "database schema version {version} is newer than supported version {CURRENT_SCHEMA_VERSION}"
    );
    Ok(())
}
