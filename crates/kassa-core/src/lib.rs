//! # kassa-core: Pure Business Logic for Kassa POS
//!
//! This crate is the **heart** of Kassa POS. It contains the invoicing logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kassa POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser client                               │   │
//! │  │    Search box ──► Invoice table ──► Export ──► Save sale        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kassa-server (axum)                          │   │
//! │  │    /api/search, /api/invoice/*, /api/sales/*                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kassa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────┐         │   │
//! │  │   │  money   │ │ invoice  │ │ reconcile │ │  export  │         │   │
//! │  │   │  Money   │ │ Invoice  │ │ Sale ⇄    │ │ Document │         │   │
//! │  │   │  parse   │ │ LineItem │ │  Invoice  │ │ Renderer │         │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kassa-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem)
//! - [`money`] - Money type with integer arithmetic and strict parsing
//! - [`invoice`] - The invoice builder
//! - [`reconcile`] - Invoice ⇄ Sale conversion and totals verification
//! - [`export`] - Document exporter contract
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use kassa_core::{Invoice, Product, SaleStatus};
//! use kassa_core::reconcile::to_sale_payload;
//!
//! let cable = Product {
//!     id: 1,
//!     name: "HDMI Cable".into(),
//!     buying_price_cents: Some(30000),
//!     selling_price_cents: 50000,
//! };
//!
//! let mut invoice = Invoice::new();
//! invoice.add_item(&cable).unwrap();
//! invoice.add_item(&cable).unwrap();
//!
//! let totals = invoice.compute_totals().unwrap();
//! assert_eq!(totals.subtotal().to_string(), "1000.00");
//! assert_eq!(totals.profit().to_string(), "400.00");
//!
//! let payload = to_sale_payload(&invoice, SaleStatus::Completed).unwrap();
//! assert_eq!(payload.items[0].quantity, 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod export;
pub mod invoice;
pub mod money;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{Invoice, InvoiceTotals, LineItem};
pub use money::Money;
pub use reconcile::SalePayload;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default number of catalog search results.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// Maximum quantity of a single line.
pub const MAX_ITEM_QUANTITY: i64 = 100_000;

/// Largest unit price accepted anywhere (1,000,000,000.00).
///
/// `MAX_PRICE_CENTS × MAX_ITEM_QUANTITY` stays below `i64::MAX` by a factor
/// of several hundred; sums past that are caught by checked arithmetic.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;
