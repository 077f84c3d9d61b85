#![allow(dead_code)]

use ragbase::document::{Document, Embedding};
use ragbase::store::VectorStore;
use tempfile::TempDir;

pub const DIM: usize = 384;

/// Deterministic `DIM`-wide embedding with a spike at `seed`.
pub fn test_embedding(seed: usize) -> Embedding {
    let mut v = vec![0.0f32; DIM];
    v[seed % DIM] = 1.0;
    v
}

pub fn test_embeddings(n: usize) -> Vec<Embedding> {
    (0..n).map(test_embedding).collect()
}

/// `n` documents from one source file, one per page.
pub fn test_documents(n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| {
            Document::new(format!("Page {i} of the report."))
                .with_metadata("source", "report.pdf")
                .with_metadata("page", i as i64)
        })
        .collect()
}

/// Open the default test collection under `<tmp>/vector_store`.
pub fn open_store(tmp: &TempDir) -> VectorStore {
    VectorStore::new("pdf_documents", tmp.path().join("vector_store")).unwrap()
}
