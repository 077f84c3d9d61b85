//! SQL DDL for the `collections`, `records`, and `schema_meta` tables.
//!
//! Embeddings live in one `vec0` virtual table per collection, created on the
//! collection's first insert once its dimension is known (see [`vec_table_name`]).

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    dimensions INTEGER CHECK(dimensions IS NULL OR dimensions > 0),
    metadata TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL,
    collection_id INTEGER NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    document TEXT NOT NULL,
    metadata TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(collection_id, id)
);

CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection_id);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        [super::migrations::CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

/// Name of the `vec0` table for a collection. Built from the integer row id,
/// so it is always a safe identifier.
pub fn vec_table_name(collection_id: i64) -> String {
    format!("vec_collection_{collection_id}")
}

/// Create the `vec0` table for a collection with a fixed dimension.
pub fn create_vec_table(
    conn: &Connection,
    collection_id: i64,
    dimensions: usize,
) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING vec0(
            id TEXT PRIMARY KEY,
            embedding FLOAT[{dimensions}]
        );",
        vec_table_name(collection_id)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn schema_creates_all_tables() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables = table_names(&conn);
        assert!(tables.contains(&"collections".to_string()));
        assert!(tables.contains(&"records".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));

        let version: String = conn
            .query_row("SELECT vec_version()", [], |r| r.get(0))
            .unwrap();
        assert!(!version.is_empty());
    }

    #[test]
    fn schema_is_idempotent() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn vec_table_accepts_matching_dimension_only() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        create_vec_table(&conn, 7, 3).unwrap();
        assert!(table_names(&conn).contains(&"vec_collection_7".to_string()));

        let ok: Vec<u8> = [1.0f32, 0.0, 0.0].iter().flat_map(|x| x.to_le_bytes()).collect();
        conn.execute(
            "INSERT INTO vec_collection_7 (id, embedding) VALUES ('a', ?1)",
            [&ok],
        )
        .unwrap();

        let too_long: Vec<u8> = [1.0f32; 4].iter().flat_map(|x| x.to_le_bytes()).collect();
        let result = conn.execute(
            "INSERT INTO vec_collection_7 (id, embedding) VALUES ('b', ?1)",
            [&too_long],
        );
        assert!(result.is_err());
    }
}
