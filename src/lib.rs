//! Document ingestion for retrieval-augmented generation.
//!
//! Two components, used independently:
//!
//! - [`embedding::EmbeddingGenerator`] loads a sentence-embedding model
//!   (all-MiniLM-L6-v2 via ONNX Runtime by default) and encodes batches of text
//!   into fixed-length vectors.
//! - [`store::VectorStore`] owns one named collection in a persistent SQLite
//!   database (with [sqlite-vec](https://github.com/asg017/sqlite-vec) holding
//!   the vectors) and bulk-inserts documents with their embeddings and metadata.
//!
//! A caller reads [`document::Document`]s, encodes their text, then adds the
//! documents and vectors to the store:
//!
//! ```no_run
//! use ragbase::config::RagbaseConfig;
//! use ragbase::document::Document;
//! use ragbase::embedding::EmbeddingGenerator;
//! use ragbase::store::VectorStore;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = RagbaseConfig::load()?;
//! let generator = EmbeddingGenerator::new(&config.embedding)?;
//! let mut store = VectorStore::open(&config.store)?;
//!
//! let docs = vec![Document::new("Rust has no garbage collector.").with_metadata("source", "a.pdf")];
//! let texts: Vec<&str> = docs.iter().map(|d| d.page_content.as_str()).collect();
//! let embeddings = generator.encode(&texts)?;
//! store.add_documents(&docs, &embeddings)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod document;
pub mod embedding;
pub mod error;
pub mod store;

pub use error::{IngestError, Result};
