mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ragbase::config::RagbaseConfig;

#[derive(Parser)]
#[command(name = "ragbase", version, about = "Embed documents into a persistent vector collection")]
struct Cli {
    /// Config file (default: ~/.ragbase/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Collection name, overriding config
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Persist directory, overriding config
    #[arg(long, global = true)]
    dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed files and add them to the collection (.jsonl = one document per line)
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the number of records in the collection
    Count,
    /// Show the first records in the collection
    Peek {
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },
    /// List collections in the persist directory
    Collections,
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the configured model to the cache directory
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RagbaseConfig::load_from(path)?,
        None => RagbaseConfig::load()?,
    };
    if let Some(collection) = cli.collection {
        config.store.collection_name = collection;
    }
    if let Some(dir) = cli.dir {
        config.store.persist_directory = dir;
    }

    // Logs go to stderr; stdout is command output.
    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Ingest { files } => {
            tokio::task::spawn_blocking(move || cli::ingest::ingest(&config, &files)).await??;
        }
        Command::Count => cli::inspect::count(&config)?,
        Command::Peek { limit } => cli::inspect::peek(&config, limit)?,
        Command::Collections => cli::inspect::collections(&config)?,
        Command::Model { action } => match action {
            ModelAction::Download => cli::model_download(&config.embedding).await?,
        },
    }

    Ok(())
}
