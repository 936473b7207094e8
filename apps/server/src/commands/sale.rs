//! # Sale Commands
//!
//! Stored sales: create, fully replace, read back.
//!
//! Payloads are checked with [`SalePayload::verify_totals`] before they are
//! written, so a client that computed the subtotal or profit differently is
//! told so instead of having the drift persisted.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, DbState};
use kassa_core::{Sale, SalePayload, SaleStatus};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sales", get(list_sales).post(create_sale))
        .route("/api/sales/{id}", get(get_sale).put(update_sale))
}

/// Id of a created or replaced sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleIdResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListSalesParams {
    pub status: Option<SaleStatus>,
}

/// GET /api/sales[?status=draft|completed]
///
/// Newest first.
pub async fn list_sales(
    State(db): State<DbState>,
    Query(params): Query<ListSalesParams>,
) -> ApiResult<Json<Vec<Sale>>> {
    debug!(status = ?params.status, "list_sales command");
    Ok(Json(db.inner().sales().list(params.status).await?))
}

/// POST /api/sales
pub async fn create_sale(
    State(db): State<DbState>,
    ApiJson(payload): ApiJson<SalePayload>,
) -> ApiResult<(StatusCode, Json<SaleIdResponse>)> {
    debug!(
        items = payload.items.len(),
        status = payload.status.as_str(),
        "create_sale command"
    );
    payload.verify_totals()?;

    let id = db.inner().sales().create(&payload).await?;
    info!(
        sale_id = %id,
        subtotal = %payload.subtotal_cents,
        status = payload.status.as_str(),
        "Sale created"
    );
    Ok((StatusCode::CREATED, Json(SaleIdResponse { id })))
}

/// GET /api/sales/{id}
pub async fn get_sale(State(db): State<DbState>, Path(id): Path<i64>) -> ApiResult<Json<Sale>> {
    debug!(sale_id = %id, "get_sale command");

    db.inner()
        .sales()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", id))
}

/// PUT /api/sales/{id}
///
/// Full replace. A payload without `status` is stored as completed.
pub async fn update_sale(
    State(db): State<DbState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<SalePayload>,
) -> ApiResult<Json<SaleIdResponse>> {
    debug!(sale_id = %id, items = payload.items.len(), "update_sale command");
    payload.verify_totals()?;

    db.inner().sales().replace(id, &payload).await?;
    info!(sale_id = %id, status = payload.status.as_str(), "Sale replaced");
    Ok(Json(SaleIdResponse { id }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::test_support::TestApp;

    fn cable_payload(quantity: i64, status: Option<&str>) -> Value {
        let mut payload = json!({
            "items": [{
                "product_id": 1,
                "name": "USB Cable",
                "quantity": quantity,
                "unit_price_cents": 50000,
                "line_total_cents": 50000 * quantity,
                "unit_buying_price_cents": 30000,
            }],
            "subtotal_cents": 50000 * quantity,
            "profit_cents": 20000 * quantity,
        });
        if let Some(status) = status {
            payload["status"] = json!(status);
        }
        payload
    }

    #[tokio::test]
    async fn test_create_get_and_replace() {
        let app = TestApp::new().await;

        let res = app.post("/api/sales", cable_payload(2, Some("draft"))).await;
        assert_eq!(res.status, StatusCode::CREATED);
        let id = res.json()["id"].as_i64().unwrap();

        let sale = app.get(&format!("/api/sales/{}", id)).await.json();
        assert_eq!(sale["status"], "draft");
        assert_eq!(sale["subtotal_cents"], 100000);

        let res = app.put(&format!("/api/sales/{}", id), cable_payload(3, None)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json()["id"], id);

        let sale = app.get(&format!("/api/sales/{}", id)).await.json();
        assert_eq!(sale["status"], "completed");
        assert_eq!(sale["profit_cents"], 60000);
        assert_eq!(sale["items"][0]["quantity"], 3);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let app = TestApp::new().await;
        app.post("/api/sales", cable_payload(1, Some("draft"))).await;
        app.post("/api/sales", cable_payload(2, None)).await;
        app.post("/api/sales", cable_payload(3, None)).await;

        let all = app.get("/api/sales").await.json();
        assert_eq!(all.as_array().unwrap().len(), 3);
        assert_eq!(all[0]["id"], 3);

        let drafts = app.get("/api/sales?status=draft").await.json();
        assert_eq!(drafts.as_array().unwrap().len(), 1);

        let res = app.get("/api/sales?status=void").await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_totals_mismatch_rejected() {
        let app = TestApp::new().await;

        let mut payload = cable_payload(2, None);
        payload["subtotal_cents"] = json!(99999);
        let res = app.post("/api/sales", payload).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json()["code"], "TOTALS_MISMATCH");
        assert_eq!(app.db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let app = TestApp::seeded().await;

        for quantity in [-3, 0] {
            let res = app.post("/api/sales", cable_payload(quantity, None)).await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST, "quantity {quantity}");
            assert_eq!(res.json()["code"], "VALIDATION_ERROR");
        }
        assert_eq!(app.db.sales().count().await.unwrap(), 0);

        let id = app
            .post("/api/sales", cable_payload(1, None))
            .await
            .json()["id"]
            .as_i64()
            .unwrap();
        let res = app.put(&format!("/api/sales/{}", id), cable_payload(-3, None)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        // the stored sale still opens for edit with its line
        let res = app.post(&format!("/api/invoice/edit/{}", id), json!({})).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json()["items"][0]["quantity"], 1);
    }

    #[tokio::test]
    async fn test_unbounded_price_rejected() {
        let app = TestApp::new().await;

        let mut payload = cable_payload(1, None);
        payload["items"][0]["unit_price_cents"] = json!(i64::MAX);
        payload["items"][0]["line_total_cents"] = json!(i64::MAX);
        payload["subtotal_cents"] = json!(i64::MAX);
        let res = app.post("/api/sales", payload).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json()["code"], "VALIDATION_ERROR");
        assert_eq!(app.db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_rejected() {
        let app = TestApp::new().await;

        let res = app
            .post("/api/sales", json!({ "subtotal_cents": 0, "profit_cents": 0 }))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json()["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_sale() {
        let app = TestApp::new().await;

        let res = app.get("/api/sales/5").await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);

        let res = app.put("/api/sales/5", cable_payload(1, None)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }
}
