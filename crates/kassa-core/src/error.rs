//! # Error Types
//!
//! Domain-specific error types for kassa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kassa-core errors (this file)                                         │
//! │  ├── CoreError        - Invoice / reconciliation failures              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kassa-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Server API errors (in app)                                            │
//! │  └── ApiError         - What the browser sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! │        DbError ─────────────────────►┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant here is recoverable at the point of the user action: the
//! invoice is never left half-modified when one of these is returned.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Catalog search was called without a usable term.
    #[error("Search query is required")]
    InvalidQuery,

    /// Submit or export was attempted on an invoice without items.
    #[error("Invoice has no items")]
    EmptyInvoice,

    /// Product id does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Sale id does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(i64),

    /// The invoice has no line for this product.
    #[error("Product {0} is not on the invoice")]
    LineItemNotFound(i64),

    /// Operator input for a quantity or price could not be accepted.
    ///
    /// ## User Workflow
    /// ```text
    /// Quantity field: "abc"
    ///      │
    ///      ▼
    /// set_quantity(id, "abc")
    ///      │
    ///      ▼
    /// ParseRejected { field: "quantity", input: "abc" }
    ///      │
    ///      ▼
    /// UI keeps the previous value and shows the message
    /// ```
    #[error("Invalid {field}: '{input}'")]
    ParseRejected { field: String, input: String },

    /// Stored or submitted subtotal/profit disagree with the items.
    #[error("{field} mismatch: stated {stated}, computed {computed}")]
    TotalsMismatch {
        field: String,
        stated: i64,
        computed: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for a rejected operator input.
    pub fn parse_rejected(field: &str, input: &str) -> Self {
        CoreError::ParseRejected {
            field: field.to_string(),
            input: input.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// An amount computed from valid inputs does not fit in a `Money`.
    #[error("{field} is too large")]
    AmountOverflow { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(CoreError::InvalidQuery.to_string(), "Search query is required");
        assert_eq!(CoreError::EmptyInvoice.to_string(), "Invoice has no items");
        assert_eq!(
            CoreError::parse_rejected("quantity", "abc").to_string(),
            "Invalid quantity: 'abc'"
        );
        assert_eq!(
            CoreError::TotalsMismatch {
                field: "subtotal".to_string(),
                stated: 900,
                computed: 1000,
            }
            .to_string(),
            "subtotal mismatch: stated 900, computed 1000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");

        let err = ValidationError::AmountOverflow {
            field: "subtotal".to_string(),
        };
        assert_eq!(err.to_string(), "subtotal is too large");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
