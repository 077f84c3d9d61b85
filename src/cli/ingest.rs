//! CLI `ingest` command: read documents, embed them, add them to the collection.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use ragbase::config::RagbaseConfig;
use ragbase::document::Document;
use ragbase::embedding::EmbeddingGenerator;
use ragbase::store::VectorStore;

/// Read documents from a file.
///
/// `.jsonl` files hold one `{"page_content": ..., "metadata": {...}}` per line;
/// blank lines are skipped. Any other file becomes a single document with a
/// `source` metadata entry holding its path.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "jsonl") {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("{}:{}: invalid document", path.display(), n + 1))
            })
            .collect()
    } else {
        Ok(vec![
            Document::new(text).with_metadata("source", path.display().to_string())
        ])
    }
}

/// Embed every document from `files` and add them to the configured collection.
pub fn ingest(config: &RagbaseConfig, files: &[PathBuf]) -> Result<()> {
    let mut documents = Vec::new();
    for file in files {
        let loaded = load_documents(file)?;
        tracing::debug!(file = %file.display(), count = loaded.len(), "loaded documents");
        documents.extend(loaded);
    }

    if documents.is_empty() {
        println!("No documents to ingest.");
        return Ok(());
    }

    let generator = EmbeddingGenerator::new(&config.embedding)?;
    let mut store = VectorStore::open(&config.store)?;

    let texts: Vec<&str> = documents.iter().map(|d| d.page_content.as_str()).collect();
    let embeddings = generator.encode(&texts)?;
    let ids = store.add_documents(&documents, &embeddings)?;

    println!(
        "Added {} documents to collection '{}' ({} total).",
        ids.len(),
        store.collection().name,
        store.count()?
    );
    Ok(())
}
