//! # Sale Reconciler
//!
//! Converts between the transient [`Invoice`] and the persisted [`Sale`].
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   NEW ──submit(draft|completed)──► PERSISTED{draft|completed}           │
//! │                                        │            ▲                   │
//! │                                        │ load       │ edit + resubmit   │
//! │                                        ▼            │ (full replace)    │
//! │                                     Invoice{linked_sale_id} ────────────┘
//! │                                                                         │
//! │   No path back to NEW. Sales are never deleted from this flow.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Subtotal and profit are denormalized onto the sale. [`SalePayload::verify_totals`]
//! recomputes them from the items so writers can refuse inconsistent payloads
//! and readers can detect drift.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::invoice::{Invoice, LineItem};
use crate::money::Money;
use crate::types::{Sale, SaleItem, SaleStatus};
use crate::validation::validate_sale_item;

// =============================================================================
// Sale Payload
// =============================================================================

/// Everything needed to create or fully replace a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalePayload {
    pub items: Vec<SaleItem>,
    pub subtotal_cents: i64,
    pub profit_cents: i64,
    #[serde(default)]
    pub status: SaleStatus,
}

impl SalePayload {
    /// Validates every item, then recomputes line totals, subtotal and
    /// profit and compares them with the stated values.
    ///
    /// ## Errors
    /// - `EmptyInvoice` when there are no items
    /// - `Validation` for an item an invoice line could not hold (blank
    ///   name, quantity outside `1..=MAX_ITEM_QUANTITY`, price out of range)
    ///   or totals that overflow
    /// - `TotalsMismatch` naming the first field that disagrees
    pub fn verify_totals(&self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyInvoice);
        }

        for item in &self.items {
            validate_sale_item(item)?;
            let computed = item
                .unit_price()
                .checked_mul_quantity(item.quantity, "line_total")?;
            check("line_total", item.line_total(), computed)?;
        }

        let (subtotal, profit) = sale_totals(&self.items)?;
        check("subtotal", Money::from_cents(self.subtotal_cents), subtotal)?;
        check("profit", Money::from_cents(self.profit_cents), profit)?;
        Ok(())
    }
}

fn check(field: &str, stated: Money, computed: Money) -> CoreResult<()> {
    if stated != computed {
        return Err(CoreError::TotalsMismatch {
            field: field.to_string(),
            stated: stated.cents(),
            computed: computed.cents(),
        });
    }
    Ok(())
}

/// Recomputes `(subtotal, profit)` from stored sale items.
pub fn sale_totals(items: &[SaleItem]) -> Result<(Money, Money), ValidationError> {
    items
        .iter()
        .try_fold((Money::zero(), Money::zero()), |(subtotal, profit), item| {
            let qty = item.quantity;
            let line_total = item.unit_price().checked_mul_quantity(qty, "subtotal")?;
            let line_profit = item
                .unit_price()
                .checked_sub(item.unit_buying_price(), "profit")?
                .checked_mul_quantity(qty, "profit")?;
            Ok((
                subtotal.checked_add(line_total, "subtotal")?,
                profit.checked_add(line_profit, "profit")?,
            ))
        })
}

/// Recomputes and compares the totals of a loaded sale.
pub fn verify_sale(sale: &Sale) -> CoreResult<()> {
    let (subtotal, profit) = sale_totals(&sale.items)?;
    check("subtotal", sale.subtotal(), subtotal)?;
    check("profit", sale.profit(), profit)
}

// =============================================================================
// Invoice → Sale
// =============================================================================

/// Builds the payload for `createSale` / `putSale`.
///
/// ## Example
/// ```rust
/// use kassa_core::{reconcile::to_sale_payload, Invoice, Product, SaleStatus};
///
/// let cable = Product {
///     id: 1,
///     name: "Cable".into(),
///     buying_price_cents: Some(30000),
///     selling_price_cents: 50000,
/// };
/// let mut invoice = Invoice::new();
/// invoice.add_item(&cable).unwrap();
/// invoice.add_item(&cable).unwrap();
///
/// let payload = to_sale_payload(&invoice, SaleStatus::Completed).unwrap();
/// assert_eq!(payload.subtotal_cents, 100000);
/// assert_eq!(payload.profit_cents, 40000);
/// ```
pub fn to_sale_payload(invoice: &Invoice, status: SaleStatus) -> CoreResult<SalePayload> {
    if invoice.is_empty() {
        return Err(CoreError::EmptyInvoice);
    }

    let items = invoice
        .items
        .iter()
        .map(|line| {
            Ok(SaleItem {
                product_id: line.product_id,
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_selling_price_cents,
                line_total_cents: line.line_total()?.cents(),
                unit_buying_price_cents: line.unit_buying_price_cents,
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    let totals = invoice.compute_totals()?;
    Ok(SalePayload {
        items,
        subtotal_cents: totals.subtotal_cents,
        profit_cents: totals.profit_cents,
        status,
    })
}

// =============================================================================
// Sale → Invoice
// =============================================================================

/// Re-hydrates an invoice from a stored sale for editing.
///
/// Stored unit prices become unit selling prices. Sales written through
/// [`SalePayload::verify_totals`] always load in full; older or hand-edited
/// records go through [`Invoice::normalize`] so the invoice invariants hold.
pub fn invoice_from_sale(sale: &Sale) -> Invoice {
    let mut invoice = Invoice {
        items: sale
            .items
            .iter()
            .map(|item| LineItem {
                product_id: item.product_id,
                name: item.name.clone(),
                quantity: item.quantity,
                unit_selling_price_cents: item.unit_price_cents,
                unit_buying_price_cents: item.unit_buying_price_cents,
            })
            .collect(),
        linked_sale_id: Some(sale.id),
    };

    invoice.normalize();
    invoice
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use chrono::Utc;

    fn product(id: i64, selling: i64, buying: Option<i64>) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            buying_price_cents: buying,
            selling_price_cents: selling,
        }
    }

    fn stored(id: i64, payload: SalePayload) -> Sale {
        Sale {
            id,
            items: payload.items,
            subtotal_cents: payload.subtotal_cents,
            profit_cents: payload.profit_cents,
            status: payload.status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_invoice_is_rejected() {
        let invoice = Invoice::new();
        assert!(matches!(
            to_sale_payload(&invoice, SaleStatus::Completed),
            Err(CoreError::EmptyInvoice)
        ));
    }

    #[test]
    fn test_payload_carries_buying_price_and_ref() {
        let mut invoice = Invoice::new();
        invoice.add_item(&product(4, 1500, Some(900))).unwrap();
        invoice.set_quantity(4, "3").unwrap();

        let payload = to_sale_payload(&invoice, SaleStatus::Draft).unwrap();
        assert_eq!(payload.status, SaleStatus::Draft);
        assert_eq!(payload.items.len(), 1);
        let item = &payload.items[0];
        assert_eq!(item.product_id, 4);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.line_total_cents, 4500);
        assert_eq!(item.unit_buying_price_cents, 900);
        assert_eq!(payload.profit_cents, 1800);
        assert!(payload.verify_totals().is_ok());
    }

    #[test]
    fn test_round_trip_reproduces_totals() {
        let mut invoice = Invoice::new();
        invoice.add_item(&product(1, 50000, Some(30000))).unwrap();
        invoice.add_item(&product(2, 1999, None)).unwrap();
        invoice.set_quantity(2, "4").unwrap();
        invoice.set_price(1, "475.25").unwrap();

        let first = to_sale_payload(&invoice, SaleStatus::Completed).unwrap();
        let sale = stored(11, first.clone());

        let reloaded = invoice_from_sale(&sale);
        assert_eq!(reloaded.linked_sale_id, Some(11));
        assert_eq!(reloaded.items, invoice.items);

        let second = to_sale_payload(&reloaded, SaleStatus::Completed).unwrap();
        assert_eq!(second.subtotal_cents, first.subtotal_cents);
        assert_eq!(second.profit_cents, first.profit_cents);
    }

    #[test]
    fn test_invoice_from_sale_merges_and_drops_bad_lines() {
        let mut invoice = Invoice::new();
        invoice.add_item(&product(1, 100, None)).unwrap();
        let mut payload = to_sale_payload(&invoice, SaleStatus::Completed).unwrap();
        payload.items.push(payload.items[0].clone());
        let mut zero = payload.items[0].clone();
        zero.product_id = 2;
        zero.quantity = 0;
        payload.items.push(zero);

        let reloaded = invoice_from_sale(&stored(3, payload));
        assert_eq!(reloaded.items.len(), 1);
        assert_eq!(reloaded.items[0].quantity, 2);
    }

    #[test]
    fn test_verify_totals_detects_drift() {
        let mut invoice = Invoice::new();
        invoice.add_item(&product(1, 50000, Some(30000))).unwrap();
        let mut payload = to_sale_payload(&invoice, SaleStatus::Completed).unwrap();

        payload.subtotal_cents += 1;
        match payload.verify_totals() {
            Err(CoreError::TotalsMismatch { field, stated, computed }) => {
                assert_eq!(field, "subtotal");
                assert_eq!(stated, 50001);
                assert_eq!(computed, 50000);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }

        payload.subtotal_cents -= 1;
        payload.items[0].line_total_cents = 1;
        assert!(matches!(
            payload.verify_totals(),
            Err(CoreError::TotalsMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_totals_rejects_lines_an_invoice_cannot_hold() {
        let mut invoice = Invoice::new();
        invoice.add_item(&product(1, 50000, Some(30000))).unwrap();
        let valid = to_sale_payload(&invoice, SaleStatus::Completed).unwrap();

        // consistent totals, but a negative quantity
        let mut negative = valid.clone();
        negative.items[0].quantity = -3;
        negative.items[0].line_total_cents = -150000;
        negative.subtotal_cents = -150000;
        negative.profit_cents = -60000;
        assert!(matches!(
            negative.verify_totals(),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let mut zero = valid.clone();
        zero.items[0].quantity = 0;
        zero.items[0].line_total_cents = 0;
        zero.subtotal_cents = 0;
        zero.profit_cents = 0;
        assert!(matches!(zero.verify_totals(), Err(CoreError::Validation(_))));

        let mut unnamed = valid.clone();
        unnamed.items[0].name = String::new();
        assert!(matches!(unnamed.verify_totals(), Err(CoreError::Validation(_))));

        let mut below_zero_cost = valid;
        below_zero_cost.items[0].unit_buying_price_cents = -1;
        below_zero_cost.profit_cents = 50001;
        assert!(matches!(
            below_zero_cost.verify_totals(),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_sale_totals_overflow_is_an_error() {
        let item = SaleItem {
            product_id: 1,
            name: "Bulk".to_string(),
            quantity: i64::MAX,
            unit_price_cents: 2,
            line_total_cents: 0,
            unit_buying_price_cents: 0,
        };
        assert!(matches!(
            sale_totals(&[item]),
            Err(ValidationError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_verify_sale() {
        let mut invoice = Invoice::new();
        invoice.add_item(&product(1, 800, Some(200))).unwrap();
        let payload = to_sale_payload(&invoice, SaleStatus::Completed).unwrap();
        let mut sale = stored(1, payload);
        assert!(verify_sale(&sale).is_ok());

        sale.profit_cents = 0;
        assert!(verify_sale(&sale).is_err());
    }
}
