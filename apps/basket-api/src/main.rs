//! # Basket API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ApiConfig::load ──► Database::new (migrations) ──► AppState            │
//! │                                                        │                │
//! │                                                        ▼                │
//! │  TcpListener::bind ──► axum::serve(router) ──► Ctrl+C / SIGTERM        │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                                               pool closed, exit        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! basket-api                          # default config location
//! basket-api --config ./basket.toml   # explicit config file
//! BASKET_PORT=9000 basket-api         # environment override
//! ```

use std::path::PathBuf;

use anyhow::Context;
use basket_api::{init_tracing, router, ApiConfig, AppState};
use basket_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting basket API server");

    let config = ApiConfig::load(config_path_arg()).context("loading configuration")?;
    let addr = config.socket_addr()?;
    info!(
        %addr,
        db_path = %config.database.path.display(),
        "Configuration loaded"
    );

    let db_config = DbConfig::new(&config.database.path)
        .max_connections(config.database.max_connections);
    if !db_config.is_in_memory() {
        if let Some(parent) = config.database.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
    }

    let db = Database::new(db_config)
        .await
        .context("opening database")?;
    info!("Database connected and migrations applied");

    let app = router(AppState::new(db.clone()));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Reads `--config <path>` / `-c <path>` from the command line.
fn config_path_arg() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|arg| arg == "--config" || arg == "-c")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
