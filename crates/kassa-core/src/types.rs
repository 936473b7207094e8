//! # Domain Types
//!
//! Core domain types used throughout Kassa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐        ┌─────────────────────┐                │
//! │  │      Product        │        │        Sale         │                │
//! │  │  ─────────────────  │        │  ─────────────────  │                │
//! │  │  id (i64)           │        │  id (i64)           │                │
//! │  │  name               │        │  items: [SaleItem]  │                │
//! │  │  buying_price?      │        │  subtotal_cents     │                │
//! │  │  selling_price      │        │  profit_cents       │                │
//! │  └─────────────────────┘        │  status             │                │
//! │                                 └─────────────────────┘                │
//! │  ┌─────────────────────┐        ┌─────────────────────┐                │
//! │  │     SaleStatus      │        │      SaleItem       │                │
//! │  │  Draft              │        │  snapshot of the    │                │
//! │  │  Completed          │        │  invoice line       │                │
//! │  └─────────────────────┘        └─────────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The invoice types themselves live in [`crate::invoice`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog entry. Never mutated by the invoice flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Server-assigned identifier.
    pub id: i64,

    /// Display name shown on the invoice and receipt.
    pub name: String,

    /// Cost in cents. Missing costs count as zero for profit.
    pub buying_price_cents: Option<i64>,

    /// Price in cents charged to the customer.
    pub selling_price_cents: i64,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Returns the buying price as Money, zero when unknown.
    #[inline]
    pub fn buying_price(&self) -> Money {
        Money::from_cents(self.buying_price_cents.unwrap_or(0))
    }
}

/// Input for creating or replacing a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub buying_price_cents: Option<i64>,
    pub selling_price_cents: i64,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a persisted sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Saved for later; still expected to change.
    Draft,
    /// Finalized by the operator.
    #[default]
    Completed,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Draft => "draft",
            SaleStatus::Completed => "completed",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted sale.
///
/// `subtotal_cents` and `profit_cents` are stored alongside the items and
/// must equal their recomputation at the time of the last write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub items: Vec<SaleItem>,
    pub subtotal_cents: i64,
    pub profit_cents: i64,
    pub status: SaleStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    /// Catalog product this line was built from.
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    /// Unit cost in cents at time of sale. Older records may omit it.
    #[serde(default)]
    pub unit_buying_price_cents: i64,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }

    /// Returns the unit cost as Money.
    #[inline]
    pub fn unit_buying_price(&self) -> Money {
        Money::from_cents(self.unit_buying_price_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
    }

    #[test]
    fn test_sale_status_serde() {
        assert_eq!(serde_json::to_string(&SaleStatus::Draft).unwrap(), "\"draft\"");
        let status: SaleStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, SaleStatus::Completed);
        assert_eq!(SaleStatus::Draft.as_str(), "draft");
    }

    #[test]
    fn test_product_missing_buying_price_is_zero() {
        let product = Product {
            id: 1,
            name: "HDMI Cable".to_string(),
            buying_price_cents: None,
            selling_price_cents: 50000,
        };
        assert_eq!(product.buying_price(), Money::zero());
        assert_eq!(product.selling_price().cents(), 50000);
    }

    #[test]
    fn test_sale_item_without_buying_price_deserializes() {
        let json = r#"{
            "product_id": 3,
            "name": "Charger",
            "quantity": 2,
            "unit_price_cents": 1500,
            "line_total_cents": 3000
        }"#;
        let item: SaleItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.unit_buying_price_cents, 0);
        assert_eq!(item.line_total().cents(), 3000);
    }
}
