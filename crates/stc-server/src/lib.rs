//! HTTP server for STC static content.
//!
//! Serves the render pipeline over HTTP:
//! - `/content/{namespace}/{id}`: HTML page embedding the rendered content
//! - `/api/content/{namespace}/{id}`: JSON description of the render result
//! - `/api/catalog/{namespace}`: items available in a namespace
//! - `/files/...`: the public content root, so proxied URLs and iframe
//!   sources resolve when the base URL points here
//!
//! # Quick Start
//!
//! ```ignore
//! use stc_server::{run_server, server_config_from_stc_config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = stc_config::Config::load(None, None)?;
//!     run_server(server_config_from_stc_config(&config, "0.1.0".to_owned())).await
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use stc_core::{DEFAULT_OVERRIDE_FILENAME, GlobalSettings};
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Public content root.
    pub root: PathBuf,
    /// Public base URL of the content root.
    pub base_url: String,
    /// File name of per-item override documents.
    pub override_filename: String,
    /// Cache transformed markup in memory.
    pub cache_enabled: bool,
    /// Site-wide render defaults.
    pub settings: GlobalSettings,
    /// Application version (for `ETag` computation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7980,
            root: PathBuf::from("public"),
            base_url: stc_config::FILES_ROUTE.to_owned(),
            override_filename: DEFAULT_OVERRIDE_FILENAME.to_owned(),
            cache_enabled: true,
            settings: GlobalSettings::default(),
            version: String::new(),
        }
    }
}

/// Build the router for `config` without binding a socket.
#[must_use]
pub fn create_app(config: &ServerConfig) -> Router {
    app::create_router(Arc::new(AppState::new(config)))
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_app(&config);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        root = %config.root.display(),
        base_url = %config.base_url,
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from STC config.
///
/// # Arguments
///
/// * `config` - STC configuration
/// * `version` - Application version
#[must_use]
pub fn server_config_from_stc_config(config: &stc_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: config.content_resolved.root.clone(),
        base_url: config.base_url(),
        override_filename: config.content_resolved.override_filename.clone(),
        cache_enabled: config.content_resolved.cache_enabled,
        settings: config.global_settings(),
        version,
    }
}
