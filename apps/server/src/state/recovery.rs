//! # Invoice Recovery
//!
//! Keeps one snapshot of the in-progress invoice so a restart does not lose
//! the operator's work.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Recovery Snapshot Lifecycle                          │
//! │                                                                         │
//! │  mutation ok ──► save(invoice) ──► write current_invoice.json.tmp      │
//! │                                    rename over current_invoice.json    │
//! │                                                                         │
//! │  invoice cleared ──► save(empty) ──► file removed                      │
//! │                                                                         │
//! │  startup ──► load() ──► Some(invoice)   restored                       │
//! │                     └─► None           missing, or corrupt (removed)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use kassa_core::Invoice;

/// Recovery storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("Recovery file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Recovery snapshot could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Holds at most one invoice snapshot.
pub trait RecoveryStore: Send + Sync {
    /// The last saved invoice. Unreadable snapshots are discarded.
    fn load(&self) -> Option<Invoice>;

    /// Overwrites the snapshot. An empty, unlinked invoice removes it.
    fn save(&self, invoice: &Invoice) -> Result<(), RecoveryError>;
}

fn is_blank(invoice: &Invoice) -> bool {
    invoice.is_empty() && invoice.linked_sale_id.is_none()
}

// =============================================================================
// File Store
// =============================================================================

/// JSON snapshot on disk, replaced atomically via rename.
#[derive(Debug, Clone)]
pub struct FileRecoveryStore {
    path: PathBuf,
}

impl FileRecoveryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileRecoveryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn discard(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Could not remove recovery file");
            }
        }
    }
}

impl RecoveryStore for FileRecoveryStore {
    fn load(&self) -> Option<Invoice> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read recovery file");
                return None;
            }
        };

        match serde_json::from_str::<Invoice>(&json) {
            Ok(invoice) => Some(invoice),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding corrupt recovery file");
                self.discard();
                None
            }
        }
    }

    fn save(&self, invoice: &Invoice) -> Result<(), RecoveryError> {
        if is_blank(invoice) {
            self.discard();
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec(invoice)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        debug!(items = invoice.items.len(), "Invoice snapshot saved");
        Ok(())
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process snapshot, for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryRecoveryStore {
    snapshot: Mutex<Option<String>>,
}

impl MemoryRecoveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with raw JSON.
    pub fn with_json(json: impl Into<String>) -> Self {
        MemoryRecoveryStore {
            snapshot: Mutex::new(Some(json.into())),
        }
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl RecoveryStore for MemoryRecoveryStore {
    fn load(&self) -> Option<Invoice> {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        let invoice = snapshot
            .as_deref()
            .map(serde_json::from_str::<Invoice>)
            .transpose();

        match invoice {
            Ok(invoice) => invoice,
            Err(e) => {
                warn!(error = %e, "Discarding corrupt recovery snapshot");
                *snapshot = None;
                None
            }
        }
    }

    fn save(&self, invoice: &Invoice) -> Result<(), RecoveryError> {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        *snapshot = if is_blank(invoice) {
            None
        } else {
            Some(serde_json::to_string(invoice)?)
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_core::Product;

    fn invoice() -> Invoice {
        let mut invoice = Invoice::new();
        invoice
            .add_item(&Product {
                id: 4,
                name: "HDMI Cable".to_string(),
                buying_price_cents: Some(60000),
                selling_price_cents: 90000,
            })
            .unwrap();
        invoice
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("kassa-recovery-{}-{}", std::process::id(), name))
            .join("current_invoice.json")
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let store = FileRecoveryStore::new(temp_file("roundtrip"));
        assert!(store.load().is_none());

        store.save(&invoice()).unwrap();
        assert_eq!(store.load(), Some(invoice()));
        assert!(!store.temp_path().exists());

        store.save(&Invoice::new()).unwrap();
        assert!(!store.path().exists());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_discards_corrupt_snapshot() {
        let path = temp_file("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let store = FileRecoveryStore::new(&path);
        assert!(store.load().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_linked_empty_invoice_is_kept() {
        let store = MemoryRecoveryStore::new();
        let linked = Invoice {
            items: Vec::new(),
            linked_sale_id: Some(9),
        };
        store.save(&linked).unwrap();
        assert_eq!(store.load(), Some(linked));
    }

    #[test]
    fn test_memory_store_discards_corrupt_snapshot() {
        let store = MemoryRecoveryStore::with_json("[1, 2");
        assert!(store.load().is_none());
        assert!(!store.has_snapshot());
    }
}
