//! Kassa POS Server - Main Entry Point
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Server Startup                                    │
//! │                                                                         │
//! │  1. Initialize Logging (RUST_LOG, default info,kassa=debug)            │
//! │  2. Load Configuration (.env, KASSA_* variables)                       │
//! │  3. Connect to Database (SQLite, WAL, run migrations)                  │
//! │  4. Restore the last invoice snapshot                                  │
//! │  5. Serve HTTP until Ctrl+C / SIGTERM                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use kassa_db::{Database, DbConfig};
use kassa_server::config::AppConfig;
use kassa_server::{build_router, build_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Kassa POS server");

    let config = AppConfig::load().context("Invalid configuration")?;
    info!(
        addr = %config.socket_addr(),
        db_path = %config.db_path.display(),
        recovery_path = %config.recovery_path.display(),
        store = %config.store.store_name,
        "Configuration loaded"
    );

    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create data directory {}", parent.display()))?;
        }
    }

    let db = Database::new(DbConfig::new(&config.db_path))
        .await
        .context("Database initialization failed")?;
    info!("Database connected and migrations applied");

    let state = build_state(db.clone(), &config);
    let app = build_router(state);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
