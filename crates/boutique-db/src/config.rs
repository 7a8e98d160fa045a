//! Store configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.
//!
//! | Variable                   | Default            |
//! |----------------------------|--------------------|
//! | `BOUTIQUE_DB_PATH`         | `./boutique.db`    |
//! | `BOUTIQUE_MAX_CONNECTIONS` | `5`                |
//! | `BOUTIQUE_INVOICE_PREFIX`  | `DB{current year}` |
//! | `BOUTIQUE_VERIFY_TOTALS`   | `false`            |

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pool::DbConfig;

/// Store-level settings for the database and the checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Tag in front of the invoice sequence. `None` means `DB{year}`.
    pub invoice_prefix: Option<String>,

    /// Recompute line totals, subtotal and total before accepting a cart
    pub verify_totals: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: PathBuf::from("./boutique.db"),
            max_connections: 5,
            invoice_prefix: None,
            verify_totals: false,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();

        let max_connections = match lookup("BOUTIQUE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("BOUTIQUE_MAX_CONNECTIONS".to_string()))?,
            None => defaults.max_connections,
        };

        let verify_totals = match lookup("BOUTIQUE_VERIFY_TOTALS") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("BOUTIQUE_VERIFY_TOTALS".to_string()))?,
            None => defaults.verify_totals,
        };

        let invoice_prefix = match lookup("BOUTIQUE_INVOICE_PREFIX") {
            Some(raw) => {
                let prefix = raw.trim().to_string();
                if prefix.is_empty() || prefix.ends_with('-') {
                    return Err(ConfigError::InvalidValue(
                        "BOUTIQUE_INVOICE_PREFIX".to_string(),
                    ));
                }
                Some(prefix)
            }
            None => None,
        };

        Ok(StoreConfig {
            database_path: lookup("BOUTIQUE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            max_connections,
            invoice_prefix,
            verify_totals,
        })
    }

    /// Pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StoreConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.max_connections, 5);
        assert!(!config.verify_totals);
        assert_eq!(config.invoice_prefix, None);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BOUTIQUE_DB_PATH", "/tmp/shop.db"),
            ("BOUTIQUE_MAX_CONNECTIONS", "8"),
            ("BOUTIQUE_INVOICE_PREFIX", "KOCHI"),
            ("BOUTIQUE_VERIFY_TOTALS", "yes"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.db_config().max_connections, 8);
        assert!(config.verify_totals);
        assert_eq!(config.invoice_prefix.as_deref(), Some("KOCHI"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("BOUTIQUE_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(load(&[("BOUTIQUE_VERIFY_TOTALS", "maybe")]).is_err());
        assert!(load(&[("BOUTIQUE_INVOICE_PREFIX", "DB-")]).is_err());
    }
}
