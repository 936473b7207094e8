//! # Health Check
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/health | GET | Database reachability and invoice size |

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::{AppState, DbState, InvoiceState};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    pub version: String,
    pub database: bool,
    pub invoice_items: usize,
}

/// GET /api/health
///
/// 503 when the database cannot be reached.
pub async fn health(
    State(db): State<DbState>,
    State(invoice): State<InvoiceState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = db.inner().health_check().await;
    let code = if database {
        StatusCode::OK
    } else {
        tracing::warn!("Health check: database unreachable");
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        invoice_items: invoice.with_invoice(|inv| inv.item_count()),
    };
    (code, Json(response))
}
