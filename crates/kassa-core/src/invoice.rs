//! # Invoice Builder
//!
//! The invoice being assembled at the counter.
//!
//! ## Invoice Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Invoice Operations                                   │
//! │                                                                         │
//! │  Operator Action          Operation               State Change          │
//! │  ───────────────          ─────────               ────────────          │
//! │                                                                         │
//! │  Pick search result ─────► add_item() ──────────► push or qty += 1     │
//! │                                                                         │
//! │  Type quantity ──────────► set_quantity() ──────► qty = n (n ≤ 0 drops)│
//! │                                                                         │
//! │  Type price ─────────────► set_price() ─────────► unit price = p       │
//! │                                                                         │
//! │  Click remove ───────────► remove_item() ───────► line dropped         │
//! │                                                                         │
//! │  New invoice ────────────► clear() ─────────────► empty, unlinked      │
//! │                                                                         │
//! │  Totals panel ───────────► compute_totals() ────► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`; adding the same product again merges
//! - Every line has `quantity > 0`
//! - Line order is insertion order, which is also display order
//! - A rejected operation leaves the invoice untouched
//! - Subtotal and profit always fit in a `Money`; a change that would
//!   overflow them is rejected

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_price_cents, validate_product_name, validate_quantity};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Line Item
// =============================================================================

/// One product on the invoice.
///
/// Prices are frozen when the line is created so later catalog edits do not
/// change an invoice that is already on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_selling_price_cents: i64,
    /// Zero when the catalog has no cost for the product.
    pub unit_buying_price_cents: i64,
}

impl LineItem {
    /// Creates a single-unit line from a catalog product.
    pub fn from_product(product: &Product) -> Self {
        LineItem {
            product_id: product.id,
            name: product.name.clone(),
            quantity: 1,
            unit_selling_price_cents: product.selling_price().cents(),
            unit_buying_price_cents: product.buying_price().cents(),
        }
    }

    #[inline]
    pub fn unit_selling_price(&self) -> Money {
        Money::from_cents(self.unit_selling_price_cents)
    }

    #[inline]
    pub fn unit_buying_price(&self) -> Money {
        Money::from_cents(self.unit_buying_price_cents)
    }

    /// unit selling price × quantity.
    pub fn line_total(&self) -> Result<Money, ValidationError> {
        self.unit_selling_price()
            .checked_mul_quantity(self.quantity, "line_total")
    }

    /// (unit selling price − unit buying price) × quantity.
    pub fn line_profit(&self) -> Result<Money, ValidationError> {
        self.unit_selling_price()
            .checked_sub(self.unit_buying_price(), "line_profit")?
            .checked_mul_quantity(self.quantity, "line_profit")
    }

    fn is_valid(&self) -> bool {
        validate_product_name(&self.name).is_ok()
            && validate_quantity(self.quantity).is_ok()
            && validate_price_cents("unit_selling_price", self.unit_selling_price_cents).is_ok()
            && validate_price_cents("unit_buying_price", self.unit_buying_price_cents).is_ok()
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// The transient invoice.
///
/// `linked_sale_id` is set while an existing sale is being edited; submitting
/// then replaces that sale instead of creating a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Invoice {
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub linked_sale_id: Option<i64>,
}

impl Invoice {
    /// Creates a new empty invoice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of a product, merging with an existing line.
    ///
    /// ## Behavior
    /// - Product already on the invoice: quantity += 1, prices untouched
    /// - Otherwise: appends a line with quantity 1 and the catalog prices
    pub fn add_item(&mut self, product: &Product) -> CoreResult<()> {
        self.apply(|invoice| {
            if let Some(item) = invoice.line_mut(product.id) {
                let new_qty = item.quantity + 1;
                if new_qty > MAX_ITEM_QUANTITY {
                    return Err(ValidationError::OutOfRange {
                        field: "quantity".to_string(),
                        min: 1,
                        max: MAX_ITEM_QUANTITY,
                    }
                    .into());
                }
                item.quantity = new_qty;
                return Ok(());
            }

            let line = LineItem::from_product(product);
            validate_price_cents("unit_selling_price", line.unit_selling_price_cents)?;
            validate_price_cents("unit_buying_price", line.unit_buying_price_cents)?;
            invoice.items.push(line);
            Ok(())
        })
    }

    /// Sets a line's quantity from operator input.
    ///
    /// ## Behavior
    /// - Input is not an integer: `ParseRejected`, nothing changes
    /// - `n <= 0`: same as [`Invoice::remove_item`]
    /// - Otherwise the line's quantity becomes `n`
    ///
    /// ```rust
    /// use kassa_core::{Invoice, Product};
    ///
    /// let cable = Product {
    ///     id: 1,
    ///     name: "Cable".into(),
    ///     buying_price_cents: None,
    ///     selling_price_cents: 50000,
    /// };
    /// let mut invoice = Invoice::new();
    /// invoice.add_item(&cable).unwrap();
    ///
    /// invoice.set_quantity(1, "3").unwrap();
    /// assert_eq!(invoice.items[0].quantity, 3);
    ///
    /// assert!(invoice.set_quantity(1, "abc").is_err());
    /// assert_eq!(invoice.items[0].quantity, 3);
    /// ```
    pub fn set_quantity(&mut self, product_id: i64, input: &str) -> CoreResult<()> {
        let quantity: i64 = input
            .trim()
            .parse()
            .map_err(|_| CoreError::parse_rejected("quantity", input))?;

        if quantity <= 0 {
            self.remove_item(product_id);
            return Ok(());
        }

        validate_quantity(quantity)?;

        self.apply(|invoice| {
            let item = invoice
                .line_mut(product_id)
                .ok_or(CoreError::LineItemNotFound(product_id))?;
            item.quantity = quantity;
            Ok(())
        })
    }

    /// Sets a line's unit selling price from operator input.
    ///
    /// Accepts a non-negative decimal with at most two fractional digits, up
    /// to [`crate::MAX_PRICE_CENTS`]. Anything else is `ParseRejected` and
    /// nothing changes.
    pub fn set_price(&mut self, product_id: i64, input: &str) -> CoreResult<()> {
        let price = Money::parse(input)
            .ok()
            .filter(|p| !p.is_negative())
            .ok_or_else(|| CoreError::parse_rejected("price", input))?;

        self.apply(|invoice| {
            let item = invoice
                .line_mut(product_id)
                .ok_or(CoreError::LineItemNotFound(product_id))?;
            item.unit_selling_price_cents = price.cents();
            Ok(())
        })
    }

    /// Removes a line. Removing an absent product is a no-op.
    pub fn remove_item(&mut self, product_id: i64) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Empties the invoice and drops the link to any edited sale.
    pub fn clear(&mut self) {
        self.items.clear();
        self.linked_sale_id = None;
    }

    /// Restores the invariants on an invoice that did not come from the
    /// builder operations (a stored sale, a recovery file).
    ///
    /// Lines that could never have been built are dropped, repeated product
    /// ids are merged (capped at `MAX_ITEM_QUANTITY`), and an invoice whose
    /// totals still overflow is emptied. The link to a sale is kept.
    ///
    /// Returns the number of lines dropped or merged away.
    pub fn normalize(&mut self) -> usize {
        let before = self.items.len();
        let mut items: Vec<LineItem> = Vec::with_capacity(before);

        for line in self.items.drain(..).filter(LineItem::is_valid) {
            match items.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => {
                    existing.quantity = (existing.quantity + line.quantity).min(MAX_ITEM_QUANTITY);
                }
                None => items.push(line),
            }
        }

        self.items = items;
        if self.compute_totals().is_err() {
            self.items.clear();
        }
        before - self.items.len()
    }

    /// Runs a change on a copy and commits it only when it succeeds and the
    /// totals still fit.
    fn apply<F>(&mut self, change: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Invoice) -> CoreResult<()>,
    {
        let mut next = self.clone();
        change(&mut next)?;
        next.compute_totals()?;
        *self = next;
        Ok(())
    }

    /// Looks up the line for a product.
    pub fn line(&self, product_id: i64) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: i64) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Σ line totals.
    pub fn subtotal(&self) -> Result<Money, ValidationError> {
        Money::checked_sum(self.items.iter().map(LineItem::line_total), "subtotal")
    }

    /// Σ line profits.
    pub fn profit(&self) -> Result<Money, ValidationError> {
        Money::checked_sum(self.items.iter().map(LineItem::line_profit), "profit")
    }

    /// Derived totals. Pure; calling it twice yields the same value.
    ///
    /// Only fails for an invoice assembled outside the builder operations.
    pub fn compute_totals(&self) -> CoreResult<InvoiceTotals> {
        Ok(InvoiceTotals {
            item_count: self.item_count(),
            total_quantity: self.total_quantity(),
            subtotal_cents: self.subtotal()?.cents(),
            profit_cents: self.profit()?.cents(),
        })
    }

    /// Checks if the invoice has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Totals summary for the totals panel and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub profit_cents: i64,
}

impl InvoiceTotals {
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
// Unit Tests
// =============================================================================
