//! Text-to-vector embedding.
//!
//! [`EmbeddingProvider`] is the seam over a concrete model; [`LocalEmbeddingProvider`]
//! runs all-MiniLM-L6-v2 through ONNX Runtime. [`EmbeddingGenerator`] is what the
//! pipeline holds: it owns a loaded provider, encodes whole batches at once, and
//! checks the provider's output shape.
//!
//! [`LocalEmbeddingProvider`]: local::LocalEmbeddingProvider

pub mod local;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::EmbeddingConfig;
use crate::document::Embedding;
use crate::error::{IngestError, Result};

/// Trait for embedding text into vectors.
///
/// Implementations are synchronous; async callers should use
/// `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts in one model call. Output order matches input order.
    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Number of dimensions every vector from this provider has.
    fn dimensions(&self) -> usize;

    /// Name of the underlying model, for logs and errors.
    fn model_name(&self) -> &str;
}

/// Create an embedding provider from config.
///
/// Currently only `"local"` is supported (ONNX Runtime + tokenizers).
pub fn create_provider(config: &EmbeddingConfig) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider = local::LocalEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local"),
    }
}

/// Loads an embedding model once and encodes batches of text with it.
pub struct EmbeddingGenerator {
    model_name: String,
    provider: Option<Box<dyn EmbeddingProvider>>,
    show_progress: bool,
}

impl EmbeddingGenerator {
    /// Build a generator and load its model immediately.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let mut generator = Self::unloaded(config);
        generator.load(config)?;
        Ok(generator)
    }

    /// Build a generator without loading the model. [`encode`](Self::encode)
    /// fails with [`IngestError::NotInitialized`] until [`load`](Self::load) succeeds.
    pub fn unloaded(config: &EmbeddingConfig) -> Self {
        Self {
            model_name: config.model.clone(),
            provider: None,
            show_progress: config.show_progress,
        }
    }

    /// Wrap an already-constructed provider.
    pub fn with_provider(provider: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            model_name: provider.model_name().to_string(),
            provider: Some(provider),
            show_progress: false,
        }
    }

    /// Load (or reload) the configured model. No retry, no fallback model.
    /// On failure the generator keeps its previous model, name, and settings.
    pub fn load(&mut self, config: &EmbeddingConfig) -> Result<()> {
        tracing::info!(model = %config.model, "loading embedding model");

        match create_provider(config) {
            Ok(provider) => {
                tracing::info!(
                    model = %config.model,
                    dimensions = provider.dimensions(),
                    "embedding model loaded"
                );
                self.model_name = config.model.clone();
                self.show_progress = config.show_progress;
                self.provider = Some(provider);
                Ok(())
            }
            Err(e) => {
                tracing::error!(model = %config.model, error = %e, "error loading embedding model");
                Err(IngestError::ModelLoad {
                    model: config.model.clone(),
                    source: e.into(),
                })
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Embedding dimensionality, once a model is loaded.
    pub fn dimensions(&self) -> Option<usize> {
        self.provider.as_ref().map(|p| p.dimensions())
    }

    /// Encode all `texts` in a single batch call. One embedding per input, in order.
    pub fn encode<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Embedding>> {
        let Some(provider) = self.provider.as_deref() else {
            tracing::error!(model = %self.model_name, "encode called before model was loaded");
            return Err(IngestError::NotInitialized {
                model: self.model_name.clone(),
            });
        };

        if texts.is_empty() {
            return Ok(vec![]);
        }

        tracing::info!(count = texts.len(), "generating embeddings");
        let inputs: Vec<&str> = texts.iter().map(AsRef::as_ref).collect();

        let spinner = self.spinner(inputs.len());
        let result = provider.embed_batch(&inputs);
        spinner.finish_and_clear();

        let embeddings = result
            .and_then(|embeddings| {
                check_shape(&embeddings, inputs.len(), provider.dimensions())?;
                Ok(embeddings)
            })
            .map_err(|e| {
                tracing::error!(model = %self.model_name, error = %e, "error generating embeddings");
                IngestError::Encode {
                    model: self.model_name.clone(),
                    source: e.into(),
                }
            })?;

        tracing::info!(
            shape = ?(embeddings.len(), provider.dimensions()),
            "generated embeddings"
        );
        Ok(embeddings)
    }

    fn spinner(&self, count: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(format!("embedding {count} texts"));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

/// Provider output must have one vector per input, each of the declared width.
fn check_shape(embeddings: &[Vec<f32>], expected: usize, dimensions: usize) -> anyhow::Result<()> {
    anyhow::ensure!(
        embeddings.len() == expected,
        "model returned {} embeddings for {expected} texts",
        embeddings.len()
    );
    if let Some((i, bad)) = embeddings.iter().enumerate().find(|(_, e)| e.len() != dimensions) {
        anyhow::bail!(
            "embedding {i} has {} dimensions, expected {dimensions}",
            bad.len()
        );
    }
    Ok(())
}
