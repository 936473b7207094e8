//! # Configuration State
//!
//! Store identity and lookup limits shared by every handler.
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};

use kassa_core::export::StoreHeader;
use kassa_core::{Money, DEFAULT_SEARCH_LIMIT};

/// Application configuration visible to handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigState {
    /// Store name (printed on documents and used in file names)
    pub store_name: String,

    /// Store phone number (printed under the name when set)
    pub store_phone: Option<String>,

    /// Currency label printed before amounts
    pub currency: String,

    /// Maximum products returned by a catalog search
    pub search_limit: i64,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    fn default() -> Self {
        ConfigState {
            store_name: "Kassa Electronics".to_string(),
            store_phone: None,
            currency: "LKR".to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl ConfigState {
    /// Header handed to the document renderer.
    pub fn store_header(&self) -> StoreHeader {
        StoreHeader {
            name: self.store_name.clone(),
            phone: self.store_phone.clone(),
            currency: self.currency.clone(),
        }
    }

    /// Formats an amount with the configured currency, e.g. `LKR 1000.00`.
    pub fn format_currency(&self, amount: Money) -> String {
        amount.with_currency(&self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigState::default();
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.format_currency(Money::from_cents(100000)), "LKR 1000.00");
    }

    #[test]
    fn test_store_header() {
        let config = ConfigState {
            store_phone: Some("077 123 4567".to_string()),
            ..ConfigState::default()
        };
        let header = config.store_header();
        assert_eq!(header.name, "Kassa Electronics");
        assert_eq!(header.phone.as_deref(), Some("077 123 4567"));
        assert_eq!(header.currency, "LKR");
    }
}
