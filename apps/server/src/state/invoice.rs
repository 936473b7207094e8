//! # Invoice State
//!
//! Owns the invoice the operator is currently building.
//!
//! ## Thread Safety
//! The invoice is wrapped in `Arc<Mutex<T>>`: handlers may run
//! concurrently, but only one may change the invoice at a time.
//!
//! ## Invoice Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Invoice State Operations                             │
//! │                                                                         │
//! │  Browser Action           Handler                 State Change          │
//! │  ──────────────           ───────                 ────────────          │
//! │                                                                         │
//! │  Pick Product ───────────► add_item() ──────────► merge or append      │
//! │  Type Quantity ──────────► set_quantity() ──────► qty = n (0 removes)  │
//! │  Type Price ─────────────► set_price() ─────────► unit price = p       │
//! │  Click Remove ───────────► remove_item() ───────► line dropped         │
//! │  Click Clear ────────────► clear() ─────────────► empty, unlinked      │
//! │  Export ─────────────────► export() ────────────► (read only, locked)  │
//! │                                                                         │
//! │  Every successful change is snapshotted to the RecoveryStore.          │
//! │  While an export runs, changes are refused with ExportInProgress.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::recovery::RecoveryStore;
use kassa_core::{CoreResult, Invoice};

/// Managed invoice session.
#[derive(Clone)]
pub struct InvoiceState {
    invoice: Arc<Mutex<Invoice>>,
    recovery: Arc<dyn RecoveryStore>,
    exporting: Arc<AtomicBool>,
}

impl std::fmt::Debug for InvoiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceState")
            .field("invoice", &*self.lock())
            .field("exporting", &self.is_exporting())
            .finish()
    }
}

impl InvoiceState {
    /// Creates the session, restoring the last snapshot when one exists.
    ///
    /// A restored snapshot is normalized before use.
    pub fn new(recovery: Arc<dyn RecoveryStore>) -> Self {
        let invoice = match recovery.load() {
            Some(mut invoice) => {
                let dropped = invoice.normalize();
                if dropped > 0 {
                    warn!(dropped, "Recovery snapshot had invalid lines, repaired");
                }
                info!(
                    items = invoice.items.len(),
                    linked_sale_id = ?invoice.linked_sale_id,
                    "Restored invoice from recovery snapshot"
                );
                invoice
            }
            None => Invoice::new(),
        };

        InvoiceState {
            invoice: Arc::new(Mutex::new(invoice)),
            recovery,
            exporting: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Invoice> {
        self.invoice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, invoice: &Invoice) {
        if let Err(e) = self.recovery.save(invoice) {
            warn!(error = %e, "Could not snapshot invoice");
        }
    }

    /// Executes a read-only closure with the invoice.
    pub fn with_invoice<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Invoice) -> R,
    {
        f(&self.lock())
    }

    /// A copy of the current invoice.
    pub fn snapshot(&self) -> Invoice {
        self.lock().clone()
    }

    /// Applies a change to the invoice.
    ///
    /// The closure works on a copy which is committed and snapshotted only
    /// when it returns `Ok`, so a rejected change leaves the invoice as it
    /// was.
    pub fn with_invoice_mut<F, R>(&self, f: F) -> ApiResult<R>
    where
        F: FnOnce(&mut Invoice) -> CoreResult<R>,
    {
        if self.is_exporting() {
            return Err(ApiError::export_in_progress());
        }

        let mut guard = self.lock();
        let mut draft = guard.clone();
        let result = f(&mut draft)?;

        if draft != *guard {
            *guard = draft;
            self.persist(&guard);
        }
        Ok(result)
    }

    /// Replaces the whole invoice (loading a sale for edit).
    pub fn replace(&self, invoice: Invoice) -> ApiResult<()> {
        self.with_invoice_mut(|current| {
            *current = invoice;
            Ok(())
        })
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    /// Marks an export as running until the guard is dropped.
    pub fn begin_export(&self) -> ApiResult<ExportGuard> {
        self.exporting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ApiError::export_in_progress())?;

        Ok(ExportGuard {
            flag: Arc::clone(&self.exporting),
        })
    }
}

/// Clears the export flag on drop.
#[derive(Debug)]
pub struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::recovery::MemoryRecoveryStore;
    use kassa_core::{CoreError, Product};
    use serde_json::json;

    fn cable() -> Product {
        Product {
            id: 1,
            name: "USB Cable".to_string(),
            buying_price_cents: Some(30000),
            selling_price_cents: 50000,
        }
    }

    fn state() -> (InvoiceState, Arc<MemoryRecoveryStore>) {
        let store = Arc::new(MemoryRecoveryStore::new());
        (InvoiceState::new(store.clone()), store)
    }

    #[test]
    fn test_mutation_is_snapshotted() {
        let (state, store) = state();
        state.with_invoice_mut(|inv| inv.add_item(&cable())).unwrap();

        assert!(store.has_snapshot());
        assert_eq!(store.load(), Some(state.snapshot()));
    }

    #[test]
    fn test_restores_snapshot_on_start() {
        let (state, store) = state();
        state.with_invoice_mut(|inv| inv.add_item(&cable())).unwrap();
        state.with_invoice_mut(|inv| inv.add_item(&cable())).unwrap();

        let restored = InvoiceState::new(store);
        assert_eq!(restored.with_invoice(|inv| inv.total_quantity()), 2);
    }

    #[test]
    fn test_restored_snapshot_is_normalized() {
        let line = |product_id: i64, quantity: i64| {
            json!({
                "product_id": product_id,
                "name": format!("Product {product_id}"),
                "quantity": quantity,
                "unit_selling_price_cents": 1000,
                "unit_buying_price_cents": 500,
            })
        };
        let snapshot = json!({
            "items": [line(1, 2), line(1, 3), line(2, 0), line(3, -4)],
            "linked_sale_id": 7,
        });
        let store = Arc::new(MemoryRecoveryStore::with_json(snapshot.to_string()));

        let state = InvoiceState::new(store);
        let invoice = state.snapshot();
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].product_id, 1);
        assert_eq!(invoice.items[0].quantity, 5);
        assert_eq!(invoice.linked_sale_id, Some(7));
        assert!(invoice.compute_totals().is_ok());
    }

    #[test]
    fn test_rejected_change_leaves_invoice_unchanged() {
        let (state, _) = state();
        state.with_invoice_mut(|inv| inv.add_item(&cable())).unwrap();
        let before = state.snapshot();

        let err = state
            .with_invoice_mut(|inv| {
                inv.set_quantity(1, "7")?;
                Err::<(), _>(CoreError::EmptyInvoice)
            })
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::EmptyInvoice);
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_mutations_refused_while_exporting() {
        let (state, _) = state();
        let guard = state.begin_export().unwrap();

        let err = state
            .with_invoice_mut(|inv| inv.add_item(&cable()))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ExportInProgress);
        assert!(state.begin_export().is_err());

        drop(guard);
        assert!(!state.is_exporting());
        state.with_invoice_mut(|inv| inv.add_item(&cable())).unwrap();
    }
}
