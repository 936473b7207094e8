//! # Invoice Commands
//!
//! The operator's invoice session: build, submit, reopen, export.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Invoice Lifecycle                                    │
//! │                                                                         │
//! │  ┌──────────┐  add/qty/price  ┌──────────┐  submit   ┌──────────────┐   │
//! │  │  Empty   │────────────────►│ Building │──────────►│  Persisted   │   │
//! │  │ Invoice  │                 │          │           │ draft|done   │   │
//! │  └──────────┘                 └──────────┘           └──────┬───────┘   │
//! │       ▲                            │  ▲                     │           │
//! │       │          clear             │  │   edit/{sale_id}    │           │
//! │       └────────────────────────────┘  └─────────────────────┘           │
//! │                                                                         │
//! │  After submit:                                                         │
//! │  • completed ─────────────► invoice cleared, link dropped              │
//! │  • draft of a new invoice ─► invoice cleared                           │
//! │  • draft of an edited sale ► invoice kept, still linked                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::commands::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, ConfigState, DbState, InvoiceState, RendererState};
use kassa_core::export::{build_document, ExportFormat};
use kassa_core::reconcile::{invoice_from_sale, to_sale_payload};
use kassa_core::{CoreError, Invoice, InvoiceTotals, LineItem, SaleStatus};

/// Tells the browser to offer saving the sale after a download.
pub const PROMPT_SAVE_HEADER: &str = "x-prompt-save";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/invoice", get(get_invoice))
        .route("/api/invoice/items", post(add_item))
        .route("/api/invoice/items/{product_id}", delete(remove_item))
        .route("/api/invoice/items/{product_id}/quantity", put(set_quantity))
        .route("/api/invoice/items/{product_id}/price", put(set_price))
        .route("/api/invoice/clear", post(clear_invoice))
        .route("/api/invoice/submit", post(submit_invoice))
        .route("/api/invoice/draft", post(save_draft))
        .route("/api/invoice/edit/{sale_id}", post(load_for_edit))
        .route("/api/invoice/export", get(export_invoice))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Invoice contents plus derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub items: Vec<LineItem>,
    pub linked_sale_id: Option<i64>,
    pub totals: InvoiceTotals,
}

impl TryFrom<&Invoice> for InvoiceResponse {
    type Error = CoreError;

    fn try_from(invoice: &Invoice) -> Result<Self, Self::Error> {
        Ok(InvoiceResponse {
            items: invoice.items.clone(),
            linked_sale_id: invoice.linked_sale_id,
            totals: invoice.compute_totals()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
}

/// What the operator typed. Accepts `"3"` as well as `3`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    Number(serde_json::Number),
    Text(String),
}

impl RawInput {
    fn as_text(&self) -> String {
        match self {
            RawInput::Number(n) => n.to_string(),
            RawInput::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: RawInput,
}

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub price: RawInput,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub status: Option<SaleStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub sale_id: i64,
    pub status: SaleStatus,
    pub invoice: InvoiceResponse,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

// =============================================================================
// Builder
// =============================================================================

/// GET /api/invoice
pub async fn get_invoice(State(invoice): State<InvoiceState>) -> ApiResult<Json<InvoiceResponse>> {
    debug!("get_invoice command");
    let response = invoice.with_invoice(|inv| InvoiceResponse::try_from(inv))?;
    Ok(Json(response))
}

/// POST /api/invoice/items
///
/// Adds one unit of the product, or bumps the quantity of its line.
pub async fn add_item(
    State(db): State<DbState>,
    State(invoice): State<InvoiceState>,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> ApiResult<Json<InvoiceResponse>> {
    debug!(product_id = %req.product_id, "add_item command");

    let product = db
        .inner()
        .products()
        .get_by_id(req.product_id)
        .await?
        .ok_or(CoreError::ProductNotFound(req.product_id))?;

    let response = invoice.with_invoice_mut(|inv| {
        inv.add_item(&product)?;
        InvoiceResponse::try_from(&*inv)
    })?;

    info!(product_id = product.id, name = %product.name, "Item added to invoice");
    Ok(Json(response))
}

/// PUT /api/invoice/items/{product_id}/quantity
///
/// `0` or a negative number removes the line.
pub async fn set_quantity(
    State(invoice): State<InvoiceState>,
    Path(product_id): Path<i64>,
    ApiJson(req): ApiJson<QuantityRequest>,
) -> ApiResult<Json<InvoiceResponse>> {
    let input = req.quantity.as_text();
    debug!(product_id = %product_id, input = %input, "set_quantity command");

    let response = invoice.with_invoice_mut(|inv| {
        inv.set_quantity(product_id, &input)?;
        InvoiceResponse::try_from(&*inv)
    })?;
    Ok(Json(response))
}

/// PUT /api/invoice/items/{product_id}/price
pub async fn set_price(
    State(invoice): State<InvoiceState>,
    Path(product_id): Path<i64>,
    ApiJson(req): ApiJson<PriceRequest>,
) -> ApiResult<Json<InvoiceResponse>> {
    let input = req.price.as_text();
    debug!(product_id = %product_id, input = %input, "set_price command");

    let response = invoice.with_invoice_mut(|inv| {
        inv.set_price(product_id, &input)?;
        InvoiceResponse::try_from(&*inv)
    })?;
    Ok(Json(response))
}

/// DELETE /api/invoice/items/{product_id}
pub async fn remove_item(
    State(invoice): State<InvoiceState>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<InvoiceResponse>> {
    debug!(product_id = %product_id, "remove_item command");

    let response = invoice.with_invoice_mut(|inv| {
        inv.remove_item(product_id);
        InvoiceResponse::try_from(&*inv)
    })?;
    Ok(Json(response))
}

/// POST /api/invoice/clear
pub async fn clear_invoice(State(invoice): State<InvoiceState>) -> ApiResult<Json<InvoiceResponse>> {
    debug!("clear_invoice command");

    let response = invoice.with_invoice_mut(|inv| {
        inv.clear();
        InvoiceResponse::try_from(&*inv)
    })?;
    info!("Invoice cleared");
    Ok(Json(response))
}

// =============================================================================
// Reconciler
// =============================================================================

/// POST /api/invoice/submit
///
/// Body is optional; without one the sale is stored as completed.
pub async fn submit_invoice(
    State(db): State<DbState>,
    State(invoice): State<InvoiceState>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let status = match body {
        Ok(Json(req)) => req.status.unwrap_or_default(),
        Err(JsonRejection::MissingJsonContentType(_)) => SaleStatus::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    submit(&db, &invoice, status).await.map(Json)
}

/// POST /api/invoice/draft
pub async fn save_draft(
    State(db): State<DbState>,
    State(invoice): State<InvoiceState>,
) -> ApiResult<Json<SubmitResponse>> {
    submit(&db, &invoice, SaleStatus::Draft).await.map(Json)
}

/// Persists the invoice: replaces the linked sale, or creates a new one.
///
/// A failed write leaves the invoice exactly as it was.
async fn submit(
    db: &DbState,
    invoice: &InvoiceState,
    status: SaleStatus,
) -> ApiResult<SubmitResponse> {
    if invoice.is_exporting() {
        return Err(ApiError::export_in_progress());
    }

    let snapshot = invoice.snapshot();
    debug!(
        items = snapshot.items.len(),
        linked_sale_id = ?snapshot.linked_sale_id,
        status = status.as_str(),
        "submit_invoice command"
    );

    let payload = to_sale_payload(&snapshot, status)?;

    let sale_id = match snapshot.linked_sale_id {
        Some(id) => {
            db.inner().sales().replace(id, &payload).await?;
            id
        }
        None => db.inner().sales().create(&payload).await?,
    };

    info!(
        sale_id = %sale_id,
        subtotal = %payload.subtotal_cents,
        profit = %payload.profit_cents,
        status = status.as_str(),
        edited = snapshot.linked_sale_id.is_some(),
        "Invoice submitted"
    );

    let keep = status == SaleStatus::Draft && snapshot.linked_sale_id.is_some();
    let settled = invoice.with_invoice_mut(|inv| {
        if *inv != snapshot {
            warn!(sale_id = %sale_id, "Invoice changed during submit, leaving it in place");
        } else if !keep {
            inv.clear();
        }
        InvoiceResponse::try_from(&*inv)
    });

    let response = match settled {
        Ok(response) => response,
        Err(e) => {
            warn!(sale_id = %sale_id, error = %e, "Sale saved but invoice was not reset");
            invoice.with_invoice(|inv| InvoiceResponse::try_from(inv))?
        }
    };

    Ok(SubmitResponse {
        sale_id,
        status,
        invoice: response,
    })
}

/// POST /api/invoice/edit/{sale_id}
///
/// Replaces the current invoice with the stored sale, linked for resubmit.
pub async fn load_for_edit(
    State(db): State<DbState>,
    State(invoice): State<InvoiceState>,
    Path(sale_id): Path<i64>,
) -> ApiResult<Json<InvoiceResponse>> {
    debug!(sale_id = %sale_id, "load_for_edit command");

    let sale = db
        .inner()
        .sales()
        .get_by_id(sale_id)
        .await?
        .ok_or(CoreError::SaleNotFound(sale_id))?;

    let loaded = invoice_from_sale(&sale);
    let response = InvoiceResponse::try_from(&loaded)?;
    invoice.replace(loaded)?;

    info!(sale_id = %sale_id, items = response.items.len(), "Sale loaded for edit");
    Ok(Json(response))
}

// =============================================================================
// Exporter
// =============================================================================

/// GET /api/invoice/export[?format=full_page|thermal_receipt|raster_image]
///
/// Returns the rendered document as an attachment. Invoice changes are
/// refused until rendering finishes.
pub async fn export_invoice(
    State(invoice): State<InvoiceState>,
    State(config): State<Arc<ConfigState>>,
    State(renderer): State<RendererState>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    let format = match params.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>()?,
        None => ExportFormat::FullPage,
    };
    debug!(format = %format, "export_invoice command");

    let guard = invoice.begin_export()?;
    let document = build_document(&invoice.snapshot(), config.store_header(), Local::now())?;

    let rendered = tokio::task::spawn_blocking(move || renderer.render(&document, format))
        .await
        .map_err(|e| ApiError::internal(format!("Render task failed: {}", e)))??;
    drop(guard);

    info!(
        format = %format,
        file = %rendered.file_name,
        bytes = rendered.bytes.len(),
        "Invoice exported"
    );

    let disposition = format!("attachment; filename=\"{}\"", rendered.file_name);
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::internal(format!("Invalid file name: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(rendered.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::HeaderName::from_static(PROMPT_SAVE_HEADER),
                HeaderValue::from_static("true"),
            ),
        ],
        Body::from(rendered.bytes),
    )
        .into_response())
}
