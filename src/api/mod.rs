//! HTTP API server.
//!
//! Handlers are generic over [`Database`], so the server never names a
//! concrete storage backend; binaries pick one and hand it to [`run`].

mod error;
mod identity;
pub mod notifier;
pub mod routes;
mod state;
pub mod v1;
mod validation;
mod websocket;

#[cfg(test)]
mod mod_test;
#[cfg(test)]
mod websocket_test;

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::{Database, DbError};
use crate::paths::default_db_path;

pub use error::{ApiError, ErrorResponse};
pub use identity::{CurrentUser, USER_HEADER};
pub use notifier::{ChangeNotifier, UpdateMessage};
pub use state::AppState;
pub use validation::{Validate, ValidatedJson};

/// Default port of the API server.
pub const DEFAULT_PORT: u16 = 3737;

/// Errors that stop the server from starting or serving.
#[derive(Error, Diagnostic, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(vlogforge::server::io))]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(vlogforge::server::database))]
    Database(#[from] DbError),

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(vlogforge::server::config))]
    Config { message: String },
}

/// API server configuration.
///
/// Precedence: builder calls (CLI flags) > environment > defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// SQLite database file
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            db_path: default_db_path(),
        }
    }
}

impl Config {
    /// Defaults overridden by `VF_HOST`, `VF_PORT` and `VF_DB_PATH`.
    ///
    /// Unparseable values are reported instead of silently ignored.
    pub fn new() -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Ok(host) = env::var("VF_HOST") {
            config.host = host.parse().map_err(|_| ServerError::Config {
                message: format!("VF_HOST is not an IP address: {}", host),
            })?;
        }
        if let Ok(port) = env::var("VF_PORT") {
            config.port = port.parse().map_err(|_| ServerError::Config {
                message: format!("VF_PORT is not a port number: {}", port),
            })?;
        }
        if let Some(path) = env::var_os("VF_DB_PATH").filter(|p| !p.is_empty()) {
            config.db_path = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_db_path(mut self, db_path: PathBuf) -> Self {
        self.db_path = db_path;
        self
    }
}

/// Initialize tracing subscriber with env filter
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vlogforge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Run the API server with the given configuration and database.
pub async fn run<D: Database + 'static>(config: Config, db: D) -> Result<(), ServerError> {
    init_tracing();

    let state = AppState::new(db, ChangeNotifier::new());
    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
