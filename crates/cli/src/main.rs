//! gocontext CLI
//!
//! Thin wrapper around the same indexer and storage logic the MCP server
//! exposes over stdio, so `gocontext index`/`gocontext status` can be run
//! directly from a shell without a client attached.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gocontext_core::config::Config;
use gocontext_core::project::ProjectStatus;
use gocontext_mcp_server::{indexer, project_id_for_path, validate::validate_project_path};
use gocontext_search::SearchExecutor;
use gocontext_storage::file::FileStorage;
use gocontext_storage::{StorageClient, StorageWriter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "gocontext")]
#[command(about = "Hybrid dense+lexical code search over indexed codebases")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to ~/.gocontext/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a codebase at the given path
    Index {
        /// Absolute path to the codebase root
        path: PathBuf,
        /// Re-index even if the project was already indexed
        #[arg(long)]
        force: bool,
        /// Include _test.go files (default: true)
        #[arg(long)]
        skip_tests: bool,
        /// Include vendor/ directories (default: false)
        #[arg(long)]
        include_vendor: bool,
    },
    /// Start the MCP server over stdio
    Serve,
    /// Report indexing status for a path
    Status {
        /// Absolute path to the codebase root
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Index { path, force, skip_tests, include_vendor } => {
            run_index(&config, &path, force, !skip_tests, include_vendor).await
        }
        Commands::Serve => run_serve(&config).await,
        Commands::Status { path } => run_status(&config, &path).await,
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("gocontext={level},{}={level}", env!("CARGO_PKG_NAME")))
        .init();
}

fn open_storage() -> Result<Arc<FileStorage>> {
    let dir = gocontext_core::config::indices_dir().context("failed to resolve indices directory")?;
    Ok(Arc::new(FileStorage::open(dir.join("gocontext.json"))?))
}

async fn run_index(config: &Config, path: &std::path::Path, force: bool, include_tests: bool, include_vendor: bool) -> Result<()> {
    let path = validate_project_path(&path.display().to_string())
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .context("invalid project path")?;
    if !indexer::contains_source_file(&path) {
        anyhow::bail!("{} contains no source files", path.display());
    }

    let embedder = gocontext_embeddings::factory::build_provider(config).context("failed to build embedding provider")?;
    let storage = open_storage()?;
    let project_id = project_id_for_path(&path);

    if force {
        storage.clear_project(&project_id).await.ok();
    }

    let storage_writer: Arc<dyn StorageWriter> = storage.clone();
    let outcome = indexer::index_codebase(&path, &project_id, include_tests, include_vendor, &embedder, &storage_writer).await;

    let status = ProjectStatus {
        indexed: outcome.files_failed == 0,
        path: path.display().to_string(),
        message: None,
        project: storage.get_project(&project_id).await.ok().flatten(),
        file_count: outcome.files_indexed,
        chunk_count: outcome.chunks_created,
        symbol_count: outcome.symbols_extracted,
        last_indexed_at: Some(chrono::Utc::now().to_rfc3339()),
        healthy: outcome.files_failed == 0,
    };
    storage.set_status(&project_id, status).await.ok();

    info!(
        files_indexed = outcome.files_indexed,
        files_skipped = outcome.files_skipped,
        files_failed = outcome.files_failed,
        chunks_created = outcome.chunks_created,
        "index complete"
    );
    if !outcome.errors.is_empty() {
        for error in &outcome.errors {
            eprintln!("error: {error}");
        }
    }
    Ok(())
}

async fn run_status(_config: &Config, path: &std::path::Path) -> Result<()> {
    let path = validate_project_path(&path.display().to_string())
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .context("invalid project path")?;
    let storage = open_storage()?;
    let project_id = project_id_for_path(&path);

    let status = storage
        .get_status(&project_id)
        .await
        .context("failed to read status")?
        .unwrap_or_else(|| ProjectStatus::not_indexed(path.display().to_string()));

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn run_serve(config: &Config) -> Result<()> {
    info!("starting gocontext MCP server");
    let embedder = gocontext_embeddings::factory::build_provider(config).context("failed to build embedding provider")?;
    let storage = open_storage()?;

    let storage_client: Arc<dyn StorageClient> = storage.clone();
    let executor = Arc::new(SearchExecutor::new(embedder.clone(), storage_client, config.cache.query_capacity));

    gocontext_mcp_server::run_mcp_server(executor, storage, embedder)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_index_subcommand_with_flags() {
        let cli = Cli::parse_from(["gocontext", "index", "/repo", "--force", "--include-vendor"]);
        match cli.command {
            Commands::Index { path, force, include_vendor, skip_tests } => {
                assert_eq!(path, PathBuf::from("/repo"));
                assert!(force);
                assert!(include_vendor);
                assert!(!skip_tests);
            }
            _ => panic!("expected Index subcommand"),
        }
    }

    #[test]
    fn cli_parses_status_subcommand() {
        let cli = Cli::parse_from(["gocontext", "status", "/repo"]);
        assert!(matches!(cli.command, Commands::Status { path } if path == PathBuf::from("/repo")));
    }
}
