//! Input and persisted record types.
//!
//! [`Document`] is what callers hand to the pipeline, [`StoredRecord`] is what
//! lands in a collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A dense vector produced by the embedding model.
pub type Embedding = Vec<f32>;

/// Per-document metadata. Values are scalars only.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Metadata key injected with the document's position in its insert batch.
pub const DOC_INDEX_KEY: &str = "doc_index";
/// Metadata key injected with the character count of `page_content`.
pub const CONTENT_LENGTH_KEY: &str = "content_length";

/// A scalar metadata value. Nested maps, arrays and nulls are rejected on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

/// A unit of text to ingest, with its source metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Builder-style metadata insert.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Length of `page_content` in characters, not bytes.
    pub fn content_length(&self) -> usize {
        self.page_content.chars().count()
    }

    /// Copy of this document's metadata with `doc_index` and `content_length`
    /// added. Injected keys overwrite any caller-supplied value.
    pub fn augmented_metadata(&self, doc_index: usize) -> Metadata {
        let mut metadata = self.metadata.clone();
        metadata.insert(DOC_INDEX_KEY.into(), MetadataValue::Int(doc_index as i64));
        metadata.insert(
            CONTENT_LENGTH_KEY.into(),
            MetadataValue::Int(self.content_length() as i64),
        );
        metadata
    }
}

/// A record as persisted in a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRecord {
    pub id: String,
    pub embedding: Embedding,
    pub metadata: Metadata,
    /// Copy of the source document's `page_content`.
    pub document: String,
}
