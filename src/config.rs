use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RagbaseConfig {
    pub logging: LoggingConfig,
    pub embedding: EmbeddingConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
    pub dimensions: usize,
    pub show_progress: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub collection_name: String,
    pub persist_directory: String,
    pub description: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_ragbase_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
            dimensions: 384,
            show_progress: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let persist_directory = default_ragbase_dir()
            .join("vector_store")
            .to_string_lossy()
            .into_owned();
        Self {
            collection_name: "pdf_documents".into(),
            persist_directory,
            description: "pdf doc embeddings for rag".into(),
        }
    }
}

/// Returns `~/.ragbase/`, or `./.ragbase/` when no home directory is known.
pub fn default_ragbase_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ragbase")
}

/// Returns the default config file path: `~/.ragbase/config.toml`
pub fn default_config_path() -> PathBuf {
    default_ragbase_dir().join("config.toml")
}

impl RagbaseConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            RagbaseConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (RAGBASE_STORE_DIR, RAGBASE_COLLECTION, RAGBASE_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RAGBASE_STORE_DIR") {
            self.store.persist_directory = val;
        }
        if let Ok(val) = std::env::var("RAGBASE_COLLECTION") {
            self.store.collection_name = val;
        }
        if let Ok(val) = std::env::var("RAGBASE_LOG_LEVEL") {
            self.logging.level = val;
        }
    }
}

impl StoreConfig {
    pub fn resolved_persist_directory(&self) -> PathBuf {
        expand_tilde(&self.persist_directory)
    }
}

impl EmbeddingConfig {
    /// Directory holding `model.onnx` and `tokenizer.json` for the configured model.
    pub fn model_dir(&self) -> PathBuf {
        expand_tilde(&self.cache_dir).join(&self.model)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
