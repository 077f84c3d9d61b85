//! Error type shared by the embedding and storage halves of the pipeline.
//!
//! Every variant is logged at the point of failure and then returned unchanged;
//! nothing in the library retries or recovers locally.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed underlying cause (ONNX Runtime, tokenizer, SQLite, I/O, ...).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The embedding model could not be resolved or loaded.
    #[error("failed to load embedding model {model}: {source}")]
    ModelLoad {
        model: String,
        #[source]
        source: BoxError,
    },

    /// `encode` was called on a generator whose model has not been loaded.
    #[error("embedding model {model} is not loaded")]
    NotInitialized { model: String },

    /// The model failed during inference or returned malformed output.
    #[error("embedding with {model} failed: {source}")]
    Encode {
        model: String,
        #[source]
        source: BoxError,
    },

    /// The persist directory or database could not be opened.
    #[error("failed to initialize vector store at {}: {source}", path.display())]
    StoreInit {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("number of documents ({documents}) must match number of embeddings ({embeddings})")]
    LengthMismatch { documents: usize, embeddings: usize },

    /// The bulk insert failed; the whole batch was rolled back.
    #[error("failed to add documents to collection {collection}: {source}")]
    Insert {
        collection: String,
        #[source]
        source: BoxError,
    },

    /// A read (count, get, peek) against the collection failed.
    #[error("failed to read collection {collection}: {source}")]
    Query {
        collection: String,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
