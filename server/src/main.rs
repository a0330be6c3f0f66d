mod config;
mod db;
mod error;
mod routes;
mod services;
mod state;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ServerConfig};
use crate::error::ErrorCode;
use crate::services::import::ImportError;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("template import failed: {0}")]
    Import(#[from] ImportError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "memeforge", about = "Meme template and gallery API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Load templates from a JSON seed file into the database.
    ImportTemplates {
        file: PathBuf,
        /// Add to the existing templates instead of replacing them.
        #[arg(long)]
        keep_existing: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::ImportTemplates { file, keep_existing } => {
            let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
            let count = services::import::import_file(&pool, &file, keep_existing)
                .await
                .inspect_err(|e| log_import_failure(&file, e))?;
            tracing::info!(count, file = %file.display(), keep_existing, "templates imported");
            Ok(())
        }
    }
}

async fn serve(config: ServerConfig) -> Result<(), AppError> {
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    let port = config.port;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = state::AppState::new(pool, config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "memeforge listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn log_import_failure(file: &Path, err: &ImportError) {
    tracing::error!(code = err.error_code(), file = %file.display(), error = %err, "template import failed");
}
