//! # Product Commands
//!
//! Catalog search and administration.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Search Flow                                  │
//! │                                                                         │
//! │  Operator types "cab"                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET /api/search?q=cab                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_search_query ── blank? ──► 400 INVALID_QUERY                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductRepository::search(term, search_limit)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [Cable Tie Pack, HDMI Cable 2m, USB Cable]                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{debug, info};

use crate::commands::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, ConfigState, DbState};
use kassa_core::validation::{validate_product_input, validate_search_query};
use kassa_core::{Product, ProductInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search_products))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/bulk", post(create_products_bulk))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /api/search?q=term
///
/// At most `search_limit` products whose name contains the term.
pub async fn search_products(
    State(db): State<DbState>,
    State(config): State<Arc<ConfigState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Product>>> {
    let term = validate_search_query(params.q.as_deref())?;
    debug!(query = %term, limit = %config.search_limit, "search_products command");

    let start = Instant::now();
    let products = db.inner().products().search(&term, config.search_limit).await?;

    info!(
        query = %term,
        results = products.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Search completed"
    );
    Ok(Json(products))
}

/// GET /api/products
pub async fn list_products(State(db): State<DbState>) -> ApiResult<Json<Vec<Product>>> {
    debug!("list_products command");
    Ok(Json(db.inner().products().list_all().await?))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(db): State<DbState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    debug!(id = %id, "get_product command");

    db.inner()
        .products()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// POST /api/products
pub async fn create_product(
    State(db): State<DbState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    debug!(name = %input.name, "create_product command");
    validate_product_input(&input)?;

    let product = db.inner().products().insert(&input).await?;
    info!(id = product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// POST /api/products/bulk
///
/// Every row is validated before anything is written; the insert itself is
/// one transaction.
pub async fn create_products_bulk(
    State(db): State<DbState>,
    ApiJson(inputs): ApiJson<Vec<ProductInput>>,
) -> ApiResult<(StatusCode, Json<Vec<Product>>)> {
    debug!(count = inputs.len(), "create_products_bulk command");

    for (index, input) in inputs.iter().enumerate() {
        validate_product_input(input)
            .map_err(|e| ApiError::validation(format!("Row {}: {}", index, e)))?;
    }

    let products = db.inner().products().insert_bulk(&inputs).await?;
    info!(count = products.len(), "Products imported");
    Ok((StatusCode::CREATED, Json(products)))
}

/// PUT /api/products/{id}
pub async fn update_product(
    State(db): State<DbState>,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Json<Product>> {
    debug!(id = %id, "update_product command");
    validate_product_input(&input)?;

    let product = db.inner().products().update(id, &input).await?;
    info!(id = product.id, "Product updated");
    Ok(Json(product))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    State(db): State<DbState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    debug!(id = %id, "delete_product command");

    db.inner().products().delete(id).await?;
    info!(id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_search_requires_query() {
        let app = TestApp::seeded().await;

        for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
            let res = app.get(uri).await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(res.json()["code"], "INVALID_QUERY");
        }
    }

    #[tokio::test]
    async fn test_search_matches_substring_case_insensitive() {
        let app = TestApp::seeded().await;

        let res = app.get("/api/search?q=CABLE").await;
        assert_eq!(res.status, StatusCode::OK);
        let names: Vec<String> = res
            .json()
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"USB Cable".to_string()));
        assert!(names.contains(&"HDMI Cable 2m".to_string()));

        let res = app.get("/api/search?q=zzz").await;
        assert!(res.json().as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_keeps_surrounding_spaces() {
        let app = TestApp::seeded().await;

        // "Cable " only occurs inside "HDMI Cable 2m"
        let res = app.get("/api/search?q=Cable%20").await;
        assert_eq!(res.status, StatusCode::OK);
        let body = res.json();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "HDMI Cable 2m");

        let res = app.get("/api/search?q=%20Cable").await;
        assert_eq!(res.json().as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let app = TestApp::seeded().await;

        let res = app.get("/api/search?q=50%25").await;
        let body = res.json();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "50% Off Sticker");

        let res = app.get("/api/search?q=_").await;
        assert!(res.json().as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_product_crud() {
        let app = TestApp::new().await;

        let res = app
            .post(
                "/api/products",
                json!({ "name": "Mouse", "buying_price_cents": 80000, "selling_price_cents": 120000 }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        let id = res.json()["id"].as_i64().unwrap();

        let res = app
            .put(
                &format!("/api/products/{}", id),
                json!({ "name": "Wireless Mouse", "selling_price_cents": 135000 }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        let body = res.json();
        assert_eq!(body["name"], "Wireless Mouse");
        assert!(body["buying_price_cents"].is_null());

        let res = app.get(&format!("/api/products/{}", id)).await;
        assert_eq!(res.json()["selling_price_cents"], 135000);

        let res = app
            .request(Method::DELETE, &format!("/api/products/{}", id), None)
            .await;
        assert_eq!(res.status, StatusCode::NO_CONTENT);

        let res = app.get(&format!("/api/products/{}", id)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_product_validation() {
        let app = TestApp::new().await;

        let res = app
            .post("/api/products", json!({ "name": "  ", "selling_price_cents": 100 }))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json()["code"], "VALIDATION_ERROR");

        let res = app
            .post("/api/products", json!({ "name": "Cable", "selling_price_cents": -5 }))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        let res = app
            .post(
                "/api/products",
                json!({ "name": "Cable", "selling_price_cents": 9_000_000_000_000_000_000i64 }),
            )
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json()["code"], "VALIDATION_ERROR");
        assert_eq!(app.db.products().count().await.unwrap(), 0);

        let res = app
            .put("/api/products/77", json!({ "name": "Ghost", "selling_price_cents": 100 }))
            .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bulk_import_is_all_or_nothing() {
        let app = TestApp::new().await;

        let res = app
            .post(
                "/api/products/bulk",
                json!([
                    { "name": "Keyboard", "selling_price_cents": 250000 },
                    { "name": "", "selling_price_cents": 100 },
                ]),
            )
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(res.json()["message"].as_str().unwrap().starts_with("Row 1:"));
        assert_eq!(app.db.products().count().await.unwrap(), 0);

        let res = app
            .post(
                "/api/products/bulk",
                json!([
                    { "name": "Keyboard", "selling_price_cents": 250000 },
                    { "name": "Mouse Pad", "buying_price_cents": 20000, "selling_price_cents": 45000 },
                ]),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.json().as_array().unwrap().len(), 2);
        assert_eq!(app.get("/api/products").await.json().as_array().unwrap().len(), 2);
    }
}
