//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kassa POS                              │
//! │                                                                         │
//! │  Browser                     Rust Backend                               │
//! │  ───────                     ────────────                               │
//! │                                                                         │
//! │  PUT /api/invoice/items/7/quantity                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  Result<Json<T>, ApiError>                                       │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Bad Input? ───── CoreError::ParseRejected ────── ApiError ────►│  │
//! │  │         │                                      (status + JSON)  │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  400 { "code": "PARSE_REJECTED", "message": "Invalid quantity: 'abc'" } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use kassa_core::export::ExportError;
use kassa_core::{CoreError, ValidationError};
use kassa_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// This is what the browser receives when a request fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Sale not found: 42"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Search was called without a term (400)
    InvalidQuery,

    /// Submit or export on an invoice without items (400)
    EmptyInvoice,

    /// Product, sale or invoice line not found (404)
    NotFound,

    /// Operator typed a quantity or price that could not be used (400)
    ParseRejected,

    /// Malformed request body or failed field validation (400)
    ValidationError,

    /// Stated totals disagree with the items (400)
    TotalsMismatch,

    /// The renderer cannot produce the requested format (400)
    UnsupportedFormat,

    /// The invoice is being exported; mutations wait (409)
    ExportInProgress,

    /// Storage failed; the invoice was left unchanged (500)
    PersistenceFailure,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ExportInProgress => StatusCode::CONFLICT,
            ErrorCode::PersistenceFailure | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorCode::InvalidQuery
            | ErrorCode::EmptyInvoice
            | ErrorCode::ParseRejected
            | ErrorCode::ValidationError
            | ErrorCode::TotalsMismatch
            | ErrorCode::UnsupportedFormat => StatusCode::BAD_REQUEST,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn export_in_progress() -> Self {
        ApiError::new(
            ErrorCode::ExportInProgress,
            "An export is in progress, try again when it finishes",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Converts database errors to API errors.
///
/// Details of storage failures are logged, never sent to the browser.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::ConstraintViolation { message } => {
                tracing::warn!("Constraint violation: {}", message);
                ApiError::validation("Value rejected by the catalog constraints")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::PersistenceFailure, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::PersistenceFailure, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::PersistenceFailure, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::PersistenceFailure, "Database transaction failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Stored data is malformed: {}", e);
                ApiError::new(ErrorCode::PersistenceFailure, "Stored sale could not be read")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::PersistenceFailure, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::PersistenceFailure, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InvalidQuery => ApiError::new(ErrorCode::InvalidQuery, message),
            CoreError::EmptyInvoice => ApiError::new(ErrorCode::EmptyInvoice, message),
            CoreError::ProductNotFound(_)
            | CoreError::SaleNotFound(_)
            | CoreError::LineItemNotFound(_) => ApiError::new(ErrorCode::NotFound, message),
            CoreError::ParseRejected { .. } => ApiError::new(ErrorCode::ParseRejected, message),
            CoreError::TotalsMismatch { .. } => ApiError::new(ErrorCode::TotalsMismatch, message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnknownFormat(_) => ApiError::validation(err.to_string()),
            ExportError::UnsupportedFormat(_) => {
                ApiError::new(ErrorCode::UnsupportedFormat, err.to_string())
            }
            ExportError::RenderFailed(e) => {
                tracing::error!("Rendering failed: {}", e);
                ApiError::internal("Document rendering failed")
            }
        }
    }
}

/// Malformed or incomplete JSON bodies are a client error, reported as 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_codes() {
        let cases = [
            (CoreError::InvalidQuery, ErrorCode::InvalidQuery),
            (CoreError::EmptyInvoice, ErrorCode::EmptyInvoice),
            (CoreError::SaleNotFound(3), ErrorCode::NotFound),
            (CoreError::LineItemNotFound(3), ErrorCode::NotFound),
            (
                CoreError::parse_rejected("quantity", "abc"),
                ErrorCode::ParseRejected,
            ),
            (
                CoreError::Validation(ValidationError::Required {
                    field: "name".to_string(),
                }),
                ErrorCode::ValidationError,
            ),
        ];

        for (core, code) in cases {
            assert_eq!(ApiError::from(core).code, code);
        }
    }

    #[test]
    fn test_persistence_failures_hide_details() {
        let err = ApiError::from(DbError::QueryFailed("disk I/O error at page 7".to_string()));
        assert_eq!(err.code, ErrorCode::PersistenceFailure);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("page 7"));
    }

    #[test]
    fn test_db_not_found_is_404() {
        let err = ApiError::from(DbError::not_found("Sale", 9));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Sale not found: 9");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::from(CoreError::EmptyInvoice)).unwrap();
        assert_eq!(json["code"], "EMPTY_INVOICE");
        assert_eq!(json["message"], "Invoice has no items");
    }
}
