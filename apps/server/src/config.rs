//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first when
//! present.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::state::ConfigState;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface to listen on
    pub bind_addr: IpAddr,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Where the in-progress invoice is snapshotted
    pub recovery_path: PathBuf,

    /// Store identity and lookup limits
    pub store: ConfigState,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = match lookup("KASSA_BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KASSA_BIND_ADDR".to_string()))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = lookup("KASSA_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("KASSA_PORT".to_string()))?;

        let db_path = match lookup("KASSA_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => data_dir()?.join("kassa.db"),
        };

        let recovery_path = match lookup("KASSA_RECOVERY_PATH") {
            Some(path) => PathBuf::from(path),
            None => data_dir()?.join("current_invoice.json"),
        };

        let mut store = ConfigState::default();

        if let Some(raw) = lookup("KASSA_SEARCH_LIMIT") {
            store.search_limit = raw
                .parse::<i64>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| ConfigError::InvalidValue("KASSA_SEARCH_LIMIT".to_string()))?;
        }

        if let Some(name) = lookup("KASSA_STORE_NAME") {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue("KASSA_STORE_NAME".to_string()));
            }
            store.store_name = name.trim().to_string();
        }

        store.store_phone = lookup("KASSA_STORE_PHONE")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        if let Some(currency) = lookup("KASSA_CURRENCY") {
            if currency.trim().is_empty() {
                return Err(ConfigError::InvalidValue("KASSA_CURRENCY".to_string()));
            }
            store.currency = currency.trim().to_string();
        }

        Ok(AppConfig {
            bind_addr,
            port,
            db_path,
            recovery_path,
            store,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Platform data directory.
///
/// - **macOS**: `~/Library/Application Support/com.kassa.pos/`
/// - **Windows**: `%APPDATA%\kassa\pos\data\`
/// - **Linux**: `~/.local/share/pos/`
fn data_dir() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("com", "kassa", "pos")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ConfigError::MissingRequired("KASSA_DB_PATH".to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0} (no platform data directory)")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn with_paths(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut vars = vec![
            ("KASSA_DB_PATH", "/tmp/kassa-test.db"),
            ("KASSA_RECOVERY_PATH", "/tmp/kassa-invoice.json"),
        ];
        vars.extend_from_slice(extra);
        vars
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&with_paths(&[]))).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.db_path, PathBuf::from("/tmp/kassa-test.db"));
        assert_eq!(config.store, ConfigState::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&with_paths(&[
            ("KASSA_BIND_ADDR", "127.0.0.1"),
            ("KASSA_PORT", "8080"),
            ("KASSA_SEARCH_LIMIT", "25"),
            ("KASSA_STORE_NAME", " Corner Shop "),
            ("KASSA_STORE_PHONE", "011 555 0101"),
            ("KASSA_CURRENCY", "USD"),
        ])))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.store.search_limit, 25);
        assert_eq!(config.store.store_name, "Corner Shop");
        assert_eq!(config.store.store_phone.as_deref(), Some("011 555 0101"));
        assert_eq!(config.store.currency, "USD");
    }

    #[test]
    fn test_invalid_values_are_named() {
        for (key, value) in [
            ("KASSA_PORT", "eighty"),
            ("KASSA_BIND_ADDR", "localhost:3000"),
            ("KASSA_SEARCH_LIMIT", "0"),
            ("KASSA_STORE_NAME", "  "),
            ("KASSA_CURRENCY", ""),
        ] {
            let err = AppConfig::from_lookup(lookup(&with_paths(&[(key, value)]))).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref name) if name == key));
        }
    }
}
