//! Persistent vector collection: write path and read-back.
//!
//! [`VectorStore`] owns one named collection inside a persist directory. Inserts
//! go through [`VectorStore::add_documents`], which assigns ids, augments each
//! document's metadata with its batch position and length, and writes the whole
//! batch in a single transaction: either every record lands or none do.

pub mod collection;

use std::path::{Path, PathBuf};

use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::StoreConfig;
use crate::db::{self, schema};
use crate::document::{Document, Embedding, Metadata, MetadataValue, StoredRecord};
use crate::error::{IngestError, Result};

pub use collection::{Collection, CollectionInfo};

/// Description stored on newly created collections unless configured otherwise.
pub const DEFAULT_DESCRIPTION: &str = "pdf doc embeddings for rag";

pub struct VectorStore {
    conn: Connection,
    collection: Collection,
    persist_directory: PathBuf,
}

/// A record assembled in memory, before the bulk insert.
struct PendingRecord<'a> {
    id: String,
    embedding: &'a [f32],
    metadata: Metadata,
    document: &'a str,
}

impl VectorStore {
    /// Open (or create) `collection_name` under `persist_directory`.
    pub fn new(collection_name: &str, persist_directory: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(collection_name, persist_directory.as_ref(), DEFAULT_DESCRIPTION)
    }

    /// Open the store described by config.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Self::open_with(
            &config.collection_name,
            &config.resolved_persist_directory(),
            &config.description,
        )
    }

    /// Open a collection that must already exist. Never creates one; an unknown
    /// name fails with [`IngestError::StoreInit`].
    pub fn open_existing(config: &StoreConfig) -> Result<Self> {
        let name = config.collection_name.as_str();
        Self::init(&config.resolved_persist_directory(), |conn| {
            collection::get_by_name(conn, name)?
                .with_context(|| format!("no such collection '{name}'"))
        })
    }

    fn open_with(collection_name: &str, persist_directory: &Path, description: &str) -> Result<Self> {
        Self::init(persist_directory, |conn| {
            collection::get_or_create(
                conn,
                collection_name,
                &serde_json::json!({ "description": description }),
            )
        })
    }

    fn init(
        persist_directory: &Path,
        resolve: impl FnOnce(&Connection) -> anyhow::Result<Collection>,
    ) -> Result<Self> {
        let init = || -> anyhow::Result<(Connection, Collection)> {
            let conn = db::open_database(persist_directory)?;
            let collection = resolve(&conn)?;
            Ok((conn, collection))
        };

        match init() {
            Ok((conn, collection)) => {
                tracing::info!(
                    collection = %collection.name,
                    path = %persist_directory.display(),
                    "vector store initialized"
                );
                Ok(Self {
                    conn,
                    collection,
                    persist_directory: persist_directory.to_path_buf(),
                })
            }
            Err(e) => {
                tracing::error!(
                    path = %persist_directory.display(),
                    error = %format!("{e:#}"),
                    "error initializing vector store"
                );
                Err(IngestError::StoreInit {
                    path: persist_directory.to_path_buf(),
                    source: e.into(),
                })
            }
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn persist_directory(&self) -> &Path {
        &self.persist_directory
    }

    /// Insert one record per document. Returns the generated ids in input order.
    ///
    /// Fails with [`IngestError::LengthMismatch`] before touching the database if
    /// the counts differ. No deduplication: adding the same documents again
    /// creates new records.
    pub fn add_documents(
        &mut self,
        documents: &[Document],
        embeddings: &[Embedding],
    ) -> Result<Vec<String>> {
        if documents.len() != embeddings.len() {
            let err = IngestError::LengthMismatch {
                documents: documents.len(),
                embeddings: embeddings.len(),
            };
            tracing::error!(collection = %self.collection.name, "{err}");
            return Err(err);
        }

        if documents.is_empty() {
            tracing::debug!(collection = %self.collection.name, "no documents to add");
            return Ok(vec![]);
        }

        tracing::info!(
            count = documents.len(),
            collection = %self.collection.name,
            "adding documents to vector store"
        );

        let batch: Vec<PendingRecord<'_>> = documents
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (doc, embedding))| PendingRecord {
                id: generate_id(i),
                embedding,
                metadata: doc.augmented_metadata(i),
                document: &doc.page_content,
            })
            .collect();

        let outcome = match insert_batch(&mut self.conn, self.collection.id, &batch) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    collection = %self.collection.name,
                    error = %format!("{e:#}"),
                    "error adding documents"
                );
                return Err(IngestError::Insert {
                    collection: self.collection.name.clone(),
                    source: e.into(),
                });
            }
        };

        self.collection.dimensions = Some(outcome.dimensions);
        tracing::info!(
            added = batch.len(),
            total = outcome.total,
            collection = %self.collection.name,
            "added documents to vector store"
        );

        Ok(batch.into_iter().map(|r| r.id).collect())
    }

    /// Number of records in the collection.
    pub fn count(&self) -> Result<u64> {
        collection::count_records(&self.conn, self.collection.id)
            .map_err(|e| self.query_error(e.into()))
    }

    /// Fetch records by id, in the order given. Unknown ids are skipped.
    pub fn get(&self, ids: &[&str]) -> Result<Vec<StoredRecord>> {
        ids.iter()
            .filter_map(|id| self.load_record(id).transpose())
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(|e| self.query_error(e))
    }

    /// The first `limit` records in insertion order.
    pub fn peek(&self, limit: usize) -> Result<Vec<StoredRecord>> {
        let load = || -> anyhow::Result<Vec<StoredRecord>> {
            let mut stmt = self
                .conn
                .prepare("SELECT id FROM records WHERE collection_id = ?1 ORDER BY seq LIMIT ?2")?;
            let ids = stmt
                .query_map(params![self.collection.id, limit as i64], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            ids.iter()
                .filter_map(|id| self.load_record(id).transpose())
                .collect()
        };
        load().map_err(|e| self.query_error(e))
    }

    fn load_record(&self, id: &str) -> anyhow::Result<Option<StoredRecord>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT document, metadata FROM records WHERE collection_id = ?1 AND id = ?2",
                params![self.collection.id, id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((document, metadata)) = row else {
            return Ok(None);
        };

        let metadata: Metadata = serde_json::from_str(&metadata)
            .with_context(|| format!("corrupt metadata for record {id}"))?;

        let embedding_bytes: Vec<u8> = self.conn.query_row(
            &format!(
                "SELECT embedding FROM {} WHERE id = ?1",
                schema::vec_table_name(self.collection.id)
            ),
            params![id],
            |row| row.get(0),
        )?;

        Ok(Some(StoredRecord {
            id: id.to_string(),
            embedding: bytes_to_embedding(&embedding_bytes)?,
            metadata,
            document,
        }))
    }

    fn query_error(&self, source: anyhow::Error) -> IngestError {
        tracing::error!(
            collection = %self.collection.name,
            error = %format!("{source:#}"),
            "error reading collection"
        );
        IngestError::Query {
            collection: self.collection.name.clone(),
            source: source.into(),
        }
    }
}

/// What a committed bulk insert left behind.
#[derive(Debug)]
struct InsertOutcome {
    dimensions: usize,
    /// Collection size after the insert, read inside the same transaction.
    total: u64,
}

/// Bulk insert in one transaction. Fixes the collection's dimension on first
/// use. Nothing is read after commit, so a returned error always means a
/// rolled-back batch.
fn insert_batch(
    conn: &mut Connection,
    collection_id: i64,
    batch: &[PendingRecord<'_>],
) -> anyhow::Result<InsertOutcome> {
    let dimensions = batch_dimensions(batch)?;
    check_metadata(batch)?;

    let tx = conn.transaction()?;

    let stored: Option<i64> = tx.query_row(
        "SELECT dimensions FROM collections WHERE id = ?1",
        params![collection_id],
        |row| row.get(0),
    )?;
    match stored {
        Some(existing) => anyhow::ensure!(
            existing as usize == dimensions,
            "embedding dimension {dimensions} does not match collection dimension {existing}"
        ),
        None => {
            schema::create_vec_table(&tx, collection_id, dimensions)?;
            tx.execute(
                "UPDATE collections SET dimensions = ?1 WHERE id = ?2",
                params![dimensions as i64, collection_id],
            )?;
        }
    }

    let now = chrono::Utc::now().to_rfc3339();
    {
        let mut record_stmt = tx.prepare(
            "INSERT INTO records (id, collection_id, document, metadata, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut vec_stmt = tx.prepare(&format!(
            "INSERT INTO {} (id, embedding) VALUES (?1, ?2)",
            schema::vec_table_name(collection_id)
        ))?;

        for record in batch {
            record_stmt
                .execute(params![
                    record.id,
                    collection_id,
                    record.document,
                    serde_json::to_string(&record.metadata)?,
                    now,
                ])
                .with_context(|| format!("failed to insert record {}", record.id))?;
            vec_stmt
                .execute(params![record.id, embedding_to_bytes(record.embedding)])
                .with_context(|| format!("failed to insert embedding for {}", record.id))?;
        }
    }

    let total = collection::count_records(&tx, collection_id)?;
    tx.commit()?;
    Ok(InsertOutcome { dimensions, total })
}

/// JSON has no NaN or infinity; serde_json would write them as `null`, which
/// does not read back as a scalar.
fn check_metadata(batch: &[PendingRecord<'_>]) -> anyhow::Result<()> {
    for (i, record) in batch.iter().enumerate() {
        for (key, value) in &record.metadata {
            if let MetadataValue::Float(f) = value {
                anyhow::ensure!(
                    f.is_finite(),
                    "document {i}: metadata value {key:?} is not a finite number ({f})"
                );
            }
        }
    }
    Ok(())
}

/// Every embedding in a batch must be non-empty and share one dimension.
fn batch_dimensions(batch: &[PendingRecord<'_>]) -> anyhow::Result<usize> {
    let dimensions = batch.first().map_or(0, |r| r.embedding.len());
    anyhow::ensure!(dimensions > 0, "embeddings must not be empty");
    if let Some((i, r)) = batch
        .iter()
        .enumerate()
        .find(|(_, r)| r.embedding.len() != dimensions)
    {
        anyhow::bail!(
            "embedding {i} has {} dimensions, expected {dimensions}",
            r.embedding.len()
        );
    }
    Ok(dimensions)
}

/// `doc_<8 random hex chars>_<index>`.
fn generate_id(index: usize) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("doc_{}_{index}", &token[..8])
}

/// Little-endian f32 bytes, the layout sqlite-vec expects for `FLOAT[N]`.
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|x| x.to_le_bytes()).collect()
}

pub fn bytes_to_embedding(bytes: &[u8]) -> anyhow::Result<Embedding> {
    anyhow::ensure!(
        bytes.len() % 4 == 0,
        "embedding blob length {} is not a multiple of 4",
        bytes.len()
    );
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
