//! # Kassa Server Library
//!
//! HTTP backend for the Kassa POS browser client.
//!
//! ## Module Organization
//! ```text
//! kassa_server/
//! ├── lib.rs          ◄─── You are here (router & tracing setup)
//! ├── config.rs       ◄─── Environment configuration
//! ├── export/
//! │   ├── mod.rs      ◄─── InvoiceRenderer (format dispatch)
//! │   ├── layout.rs   ◄─── Monospace page and receipt layouts
//! │   ├── pdf.rs      ◄─── A4 and 58mm PDF output
//! │   └── raster.rs   ◄─── PNG output
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState and FromRef wiring
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── invoice.rs  ◄─── Invoice session (Arc<Mutex<Invoice>>)
//! │   ├── recovery.rs ◄─── Invoice snapshot storage
//! │   └── config.rs   ◄─── Store header and limits
//! ├── commands/
//! │   ├── mod.rs      ◄─── Route table
//! │   ├── product.rs  ◄─── Catalog search/CRUD
//! │   ├── invoice.rs  ◄─── Invoice builder, submit, export
//! │   ├── sale.rs     ◄─── Stored sales
//! │   └── health.rs   ◄─── Health check
//! └── error.rs        ◄─── API error type for handlers
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod state;

use std::sync::Arc;

use axum::http::header::{self, HeaderName};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use export::InvoiceRenderer;
use kassa_db::Database;
use state::{AppState, DbState, FileRecoveryStore, InvoiceState};

/// Wires state for a running server: file-backed recovery and the PDF/PNG
/// renderer.
pub fn build_state(db: Database, config: &AppConfig) -> AppState {
    let recovery = Arc::new(FileRecoveryStore::new(&config.recovery_path));
    AppState::new(
        DbState::new(db),
        InvoiceState::new(recovery),
        config.store.clone(),
        Arc::new(InvoiceRenderer::new()),
    )
}

/// Builds the HTTP router with request tracing and CORS.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(commands::invoice::PROMPT_SAVE_HEADER),
        ]);

    commands::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG` overrides everything
/// - Default: `info` globally, `debug` for kassa crates, `warn` for sqlx
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kassa=debug,sqlx=warn,tower_http=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
