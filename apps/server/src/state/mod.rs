//! # State Module
//!
//! Manages application state for the HTTP server.
//!
//! Each concern keeps its own state type and handlers extract only what
//! they need through axum's `FromRef`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppState (Router::with_state)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │       ┌──────────────┬───────┴──────┬──────────────────┐               │
//! │       ▼              ▼              ▼                  ▼                │
//! │  ┌──────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────────┐  │
//! │  │ DbState  │  │ InvoiceState │  │ ConfigState  │  │ Renderer       │  │
//! │  │          │  │              │  │              │  │                │  │
//! │  │ Database │  │ Arc<Mutex<   │  │ store header │  │ Arc<dyn        │  │
//! │  │ (SQLite  │  │   Invoice    │  │ search limit │  │ Document-      │  │
//! │  │  pool)   │  │ >> + recovery│  │              │  │ Renderer>      │  │
//! │  └──────────┘  └──────────────┘  └──────────────┘  └────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • InvoiceState: Protected by Arc<Mutex<T>> for exclusive access       │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod invoice;
pub mod recovery;

use std::sync::Arc;

use axum::extract::FromRef;

pub use config::ConfigState;
pub use db::DbState;
pub use invoice::{ExportGuard, InvoiceState};
pub use recovery::{FileRecoveryStore, MemoryRecoveryStore, RecoveryStore};

use kassa_core::export::DocumentRenderer;

/// Shared renderer handle.
pub type RendererState = Arc<dyn DocumentRenderer>;

/// Everything the router hands to handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub invoice: InvoiceState,
    pub config: Arc<ConfigState>,
    pub renderer: RendererState,
}

impl AppState {
    pub fn new(
        db: DbState,
        invoice: InvoiceState,
        config: ConfigState,
        renderer: RendererState,
    ) -> Self {
        AppState {
            db,
            invoice,
            config: Arc::new(config),
            renderer,
        }
    }
}

impl FromRef<AppState> for DbState {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for InvoiceState {
    fn from_ref(state: &AppState) -> Self {
        state.invoice.clone()
    }
}

impl FromRef<AppState> for Arc<ConfigState> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.config)
    }
}

impl FromRef<AppState> for RendererState {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.renderer)
    }
}
