//! # HTTP Commands Module
//!
//! All endpoints exposed to the browser client.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (router, JSON extractor)
//! ├── product.rs  ◄─── Catalog search, CRUD, bulk import
//! ├── invoice.rs  ◄─── Invoice session, submit, edit, export
//! ├── sale.rs     ◄─── Stored sales
//! └── health.rs   ◄─── Liveness / database reachability
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    HTTP Command Flow                                    │
//! │                                                                         │
//! │  Browser                                                                │
//! │  ───────                                                                │
//! │  fetch('/api/invoice/items', {                                          │
//! │    method: 'POST',                                                      │
//! │    body: JSON.stringify({ product_id: 7 })                              │
//! │  });                                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  async fn add_item(                                                     │
//! │      State(db): State<DbState>,          ◄── via FromRef<AppState>      │
//! │      State(invoice): State<InvoiceState>,                               │
//! │      ApiJson(req): ApiJson<AddItemRequest>,  ◄── 400 on bad JSON        │
//! │  ) -> ApiResult<Json<InvoiceResponse>>                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Browser receives: { items, linked_sale_id, totals }                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod health;
pub mod invoice;
pub mod product;
pub mod sale;

use axum::extract::FromRequest;
use axum::Router;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body extractor whose rejections are reported as [`ApiError`]
/// (400 with the usual `{code, message}` body).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// All API routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(product::router())
        .merge(sale::router())
        .merge(invoice::router())
}
