//! # basket-api: REST Server for Basket Pricing
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PATCH /api/baskets/{id}/scan/A0001                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  routes::baskets::scan_product   (axum handler)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BasketService::scan_product     (basket-core)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductRepository / BasketRepository (basket-db, SQLite)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  204 No Content  │  404 (empty)  │  400/409/500 {code, message}        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::AppState;

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info,basket=debug,sqlx=warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,basket=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
