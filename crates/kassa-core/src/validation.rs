//! # Validation Module
//!
//! Input validation utilities for Kassa POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser                                                      │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── CHECK constraints on prices                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{ProductInput, SaleItem};
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Escape character used by [`escape_like`]; queries must declare it with
/// `ESCAPE '\'`.
pub const LIKE_ESCAPE: char = '\\';

// =============================================================================
// Search
// =============================================================================

/// Validates a catalog search term.
///
/// ## Rules
/// - Missing, empty or whitespace-only terms are `InvalidQuery`
/// - Maximum 100 characters
///
/// ## Returns
/// The term exactly as typed. Surrounding whitespace only matters for the
/// emptiness check; `"USB "` still matches `"USB Cable"` but not `"USB-C"`.
///
/// ## Example
/// ```rust
/// use kassa_core::validation::validate_search_query;
///
/// assert_eq!(validate_search_query(Some("cable ")).unwrap(), "cable ");
/// assert!(validate_search_query(Some("   ")).is_err());
/// assert!(validate_search_query(None).is_err());
/// ```
pub fn validate_search_query(query: Option<&str>) -> CoreResult<String> {
    let query = query.unwrap_or_default();

    if query.trim().is_empty() {
        return Err(CoreError::InvalidQuery);
    }

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        }
        .into());
    }

    Ok(query.to_string())
}

/// Escapes LIKE wildcards so the term matches as a literal substring.
///
/// ```rust
/// use kassa_core::validation::escape_like;
///
/// assert_eq!(escape_like("50%"), "50\\%");
/// assert_eq!(escape_like("usb_c"), "usb\\_c");
/// ```
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - Must not exceed [`MAX_PRICE_CENTS`]
///
/// ## Example
/// ```rust
/// use kassa_core::validation::validate_price_cents;
/// use kassa_core::MAX_PRICE_CENTS;
///
/// assert!(validate_price_cents("price", 1099).is_ok());
/// assert!(validate_price_cents("price", 0).is_ok());
/// assert!(validate_price_cents("price", -100).is_err());
/// assert!(validate_price_cents("price", MAX_PRICE_CENTS + 1).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a full product input before insert or update.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_price_cents("selling_price", input.selling_price_cents)?;
    if let Some(buying) = input.buying_price_cents {
        validate_price_cents("buying_price", buying)?;
    }
    Ok(())
}

/// Validates one line of a sale payload: the same rules an invoice line
/// obeys, so any stored sale can be loaded back for editing.
pub fn validate_sale_item(item: &SaleItem) -> ValidationResult<()> {
    validate_product_name(&item.name)?;
    validate_quantity(item.quantity)?;
    validate_price_cents("unit_price", item.unit_price_cents)?;
    validate_price_cents("unit_buying_price", item.unit_buying_price_cents)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
