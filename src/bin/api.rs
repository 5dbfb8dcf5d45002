//! VlogForge API server binary.
//!
//! This binary creates the concrete database implementation and passes it
//! to the API server. The API layer remains agnostic of the storage backend.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use miette::Diagnostic;
use thiserror::Error;
use tracing::info;
use vlogforge::api::{self, Config, ServerError};
use vlogforge::db::{Database, DbError, SqliteDatabase};

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Database error: {0}")]
    #[diagnostic(code(vlogforge::binary::database))]
    Database(#[from] DbError),

    #[error("Failed to create data directory: {0}")]
    #[diagnostic(code(vlogforge::binary::io))]
    Io(#[from] std::io::Error),

    #[error("API server error: {0}")]
    #[diagnostic(code(vlogforge::binary::server))]
    Server(#[from] ServerError),
}

#[derive(Parser)]
#[command(name = "vf-api")]
#[command(author, version, about = "VlogForge API server", long_about = None)]
struct Cli {
    /// Host address to bind to (default: VF_HOST or 0.0.0.0)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to listen on (default: VF_PORT or 3737)
    #[arg(short, long)]
    port: Option<u16>,

    /// Database file path (default: VF_DB_PATH or ~/.local/share/vlogforge/vlogforge.db)
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    run().await.map_err(Into::into)
}

async fn run() -> Result<(), BinaryError> {
    let cli = Cli::parse();
    api::init_tracing();

    let mut config = Config::new()?;
    if let Some(host) = cli.host {
        config = config.with_host(host);
    }
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }

    info!(path = %config.db_path.display(), "opening database");

    // Ensure parent directory exists
    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let db = SqliteDatabase::open(&config.db_path).await?;

    // Run migrations before starting the server
    db.migrate().await?;
    info!("database migrations complete");

    api::run(config, db).await?;

    Ok(())
}
