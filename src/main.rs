use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use embd::{
    ConstructExtractor, ConstructStore, DuckdbConstructStore, EmbeddingRequester,
    EmbeddingService, GitVersionControl, HttpEmbedding, InMemoryConstructStore,
    IndexRepositoryUseCase, MockEmbedding, RunConfig, RunStatus, StatsUseCase,
};

#[derive(Parser)]
#[command(name = "embd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, default_value = "~/.embd")]
    data_dir: String,

    #[arg(long, global = true)]
    mock_embeddings: bool,

    #[arg(long, global = true)]
    memory_storage: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the constructs and imports of a repository at its current
    /// commit.
    Index {
        /// Repository root (defaults to the current directory).
        #[arg(default_value = ".")]
        path: String,

        /// Repository name to record on imports (defaults to the
        /// directory name).
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show persisted record counts.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = RunConfig::from_env();

    let data_dir = expand_tilde(&cli.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let db_path = config
        .database_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&data_dir).join("embd.duckdb"));

    let store: Arc<dyn ConstructStore> = if cli.memory_storage {
        info!("Using in-memory storage");
        Arc::new(InMemoryConstructStore::new())
    } else {
        info!("Using DuckDB storage at {:?}", db_path);
        Arc::new(DuckdbConstructStore::new(&db_path)?)
    };

    match cli.command {
        Commands::Index { path, name } => {
            let embedding_service: Arc<dyn EmbeddingService> = if cli.mock_embeddings {
                info!("Using mock embedding service");
                Arc::new(MockEmbedding::new())
            } else {
                Arc::new(HttpEmbedding::from_env(config.embed_timeout))
            };

            let requester = Arc::new(EmbeddingRequester::new(
                embedding_service,
                config.chunk_size,
                config.chunk_overlap,
                config.embed_concurrency,
                config.embed_timeout,
            ));

            let use_case = IndexRepositoryUseCase::new(
                Arc::new(GitVersionControl::new()),
                Arc::new(ConstructExtractor::new()),
                requester,
                store,
            )
            .with_extensions(config.extensions.clone())
            .with_workers(config.worker_concurrency);

            // Ctrl-C requests cooperative cancellation: in-flight files
            // finish, nothing new is scheduled.
            let cancel = CancellationToken::new();
            let ctrl_c_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupt received, finishing in-flight files");
                    ctrl_c_token.cancel();
                }
            });

            let root = PathBuf::from(expand_tilde(&path));
            let summary = use_case.execute(&root, name.as_deref(), cancel).await?;

            println!("{}", summary);
            for failure in &summary.failures {
                println!("  failed: {} ({})", failure.file_path, failure.reason);
            }
            if summary.status == RunStatus::Aborted {
                std::process::exit(1);
            }
        }

        Commands::Stats => {
            let use_case = StatsUseCase::new(store);
            let stats = use_case.execute().await?;

            println!("embd statistics");
            println!("===============");
            println!("Constructs: {}", stats.constructs);
            println!("Imports:    {}", stats.imports);
            println!("Data Dir:   {}", data_dir);
        }
    }

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn index_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["embd", "index"]).expect("parse");
        match cli.command {
            Commands::Index { path, name } => {
                assert_eq!(path, ".");
                assert!(name.is_none());
            }
            _ => panic!("expected index command"),
        }
    }

    #[test]
    fn search_is_not_a_command() {
        let res = Cli::try_parse_from(["embd", "search", "query"]);
        assert!(res.is_err(), "search should not be a valid subcommand");
    }
}
