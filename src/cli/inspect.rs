//! CLI read-only commands: `count`, `peek`, `collections`.

use anyhow::Result;

use ragbase::config::RagbaseConfig;
use ragbase::store::{collection, VectorStore};

/// Print the number of records in the configured collection.
pub fn count(config: &RagbaseConfig) -> Result<()> {
    let store = VectorStore::open_existing(&config.store)?;
    println!("{}", store.count()?);
    Ok(())
}

/// Print the first `limit` records of the configured collection.
pub fn peek(config: &RagbaseConfig, limit: usize) -> Result<()> {
    let store = VectorStore::open_existing(&config.store)?;
    let records = store.peek(limit)?;

    if records.is_empty() {
        println!("Collection '{}' is empty.", store.collection().name);
        return Ok(());
    }

    for record in &records {
        println!("{}", record.id);
        println!("  metadata:  {}", serde_json::to_string(&record.metadata)?);
        println!("  embedding: [{} dims]", record.embedding.len());
        println!("  text:      {}", super::preview(&record.document, 80));
    }
    Ok(())
}

/// List every collection in the persist directory.
pub fn collections(config: &RagbaseConfig) -> Result<()> {
    let dir = config.store.resolved_persist_directory();
    let conn = ragbase::db::open_database(&dir)?;
    let infos = collection::list_collections(&conn)?;

    if infos.is_empty() {
        println!("No collections in {}", dir.display());
        return Ok(());
    }

    println!("{:<24} {:>10} {:>6}  created", "name", "records", "dims");
    for info in infos {
        let dims = info
            .dimensions
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        println!(
            "{:<24} {:>10} {:>6}  {}",
            info.name, info.count, dims, info.created_at
        );
    }
    Ok(())
}
