//! Collection rows: get-or-create by name, listing, and counts.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// A named, durable container of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    /// Fixed by the first non-empty insert; `None` while the collection is empty.
    pub dimensions: Option<usize>,
    pub metadata: serde_json::Value,
}

/// Summary line for `ragbase collections`.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub dimensions: Option<usize>,
    pub count: u64,
    pub created_at: String,
}

/// Look up a collection by name.
pub fn get_by_name(conn: &Connection, name: &str) -> Result<Option<Collection>> {
    let row = conn
        .query_row(
            "SELECT id, name, dimensions, metadata FROM collections WHERE name = ?1",
            params![name],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, name, dimensions, metadata)| {
        let metadata = match metadata {
            Some(json) => serde_json::from_str(&json)
                .with_context(|| format!("corrupt metadata for collection {name}"))?,
            None => serde_json::Value::Null,
        };
        Ok(Collection {
            id,
            name,
            dimensions: dimensions.map(|d| d as usize),
            metadata,
        })
    })
    .transpose()
}

/// Return the named collection, creating it with `metadata` if absent.
/// Metadata of an existing collection is left as is.
pub fn get_or_create(
    conn: &Connection,
    name: &str,
    metadata: &serde_json::Value,
) -> Result<Collection> {
    anyhow::ensure!(!name.trim().is_empty(), "collection name must not be empty");

    if let Some(existing) = get_by_name(conn, name)? {
        tracing::debug!(collection = name, id = existing.id, "reusing collection");
        return Ok(existing);
    }

    conn.execute(
        "INSERT INTO collections (name, metadata, created_at) VALUES (?1, ?2, ?3)",
        params![name, metadata.to_string(), chrono::Utc::now().to_rfc3339()],
    )?;
    tracing::info!(collection = name, "created collection");

    get_by_name(conn, name)?.context("collection vanished after insert")
}

/// Number of records in a collection.
pub fn count_records(conn: &Connection, collection_id: i64) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM records WHERE collection_id = ?1",
        params![collection_id],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// All collections with their record counts, oldest first.
pub fn list_collections(conn: &Connection) -> Result<Vec<CollectionInfo>> {
    let mut stmt = conn.prepare(
        "SELECT c.name, c.dimensions, c.created_at, COUNT(r.seq)
         FROM collections c LEFT JOIN records r ON r.collection_id = c.id
         GROUP BY c.id ORDER BY c.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CollectionInfo {
                name: row.get(0)?,
                dimensions: row.get::<_, Option<i64>>(1)?.map(|d| d as usize),
                created_at: row.get(2)?,
                count: row.get::<_, i64>(3)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn get_or_create_is_idempotent() {
        let conn = db::open_memory_database().unwrap();
        let meta = serde_json::json!({"description": "first"});

        let first = get_or_create(&conn, "pdf_documents", &meta).unwrap();
        let second =
            get_or_create(&conn, "pdf_documents", &serde_json::json!({"description": "other"}))
                .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.metadata["description"], "first");
        assert_eq!(second.dimensions, None);
    }

    #[test]
    fn empty_name_is_rejected() {
        let conn = db::open_memory_database().unwrap();
        assert!(get_or_create(&conn, "  ", &serde_json::Value::Null).is_err());
    }

    #[test]
    fn list_reports_empty_collections() {
        let conn = db::open_memory_database().unwrap();
        get_or_create(&conn, "a", &serde_json::Value::Null).unwrap();
        get_or_create(&conn, "b", &serde_json::Value::Null).unwrap();

        let infos = list_collections(&conn).unwrap();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(infos.iter().all(|i| i.count == 0));
    }
}
