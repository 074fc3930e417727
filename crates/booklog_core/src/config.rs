//! Environment-driven configuration.
//!
//! # Responsibility
//! - Load store, collection and logging settings from the process
//!   environment, after merging an optional `.env` file.
//!
//! # Invariants
//! - A missing or blank store connection string is an error, never a default.
//! - Values already set in the environment win over `.env` entries.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::book_repo::DEFAULT_BOOK_COLLECTION;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const STORE_URI_VAR: &str = "LIBRARY_STORE_URI";
pub const COLLECTION_VAR: &str = "LIBRARY_COLLECTION";
pub const LOG_LEVEL_VAR: &str = "LIBRARY_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "LIBRARY_LOG_DIR";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingStoreUri,
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingStoreUri => write!(
                f,
                "store connection string is missing; set {STORE_URI_VAR} in the environment or .env"
            ),
            Self::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "invalid {key} value `{value}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub store_uri: String,
    pub collection: String,
    pub log_level: &'static str,
    /// Rolling log directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl LibraryConfig {
    /// Loads configuration from `.env` (when present) and the environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_with(|_| None)
    }

    /// Same as [`Self::from_env`], but `overrides` wins for keys it returns.
    pub fn from_env_with<F>(overrides: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // A missing `.env` file is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| overrides(key).or_else(|| std::env::var(key).ok()))
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let store_uri = non_blank(STORE_URI_VAR).ok_or(ConfigError::MissingStoreUri)?;
        let collection =
            non_blank(COLLECTION_VAR).unwrap_or_else(|| DEFAULT_BOOK_COLLECTION.to_string());

        let log_level = match non_blank(LOG_LEVEL_VAR) {
            Some(value) => normalize_level(&value).map_err(|message| ConfigError::InvalidValue {
                key: LOG_LEVEL_VAR,
                value,
                message,
            })?,
            None => default_log_level(),
        };

        let log_dir = match non_blank(LOG_DIR_VAR) {
            Some(value) => {
                let path = PathBuf::from(&value);
                if !path.is_absolute() {
                    return Err(ConfigError::InvalidValue {
                        key: LOG_DIR_VAR,
                        value,
                        message: "log directory must be an absolute path".to_string(),
                    });
                }
                Some(path)
            }
            None => None,
        };

        Ok(Self {
            store_uri,
            collection,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, LibraryConfig, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| values.get(key).cloned()
    }

    #[test]
    fn missing_store_uri_is_rejected() {
        let err = LibraryConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingStoreUri);

        let err = LibraryConfig::from_lookup(lookup(&[("LIBRARY_STORE_URI", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingStoreUri);
    }

    #[test]
    fn defaults_apply_when_optional_keys_are_absent() {
        let config =
            LibraryConfig::from_lookup(lookup(&[("LIBRARY_STORE_URI", "sqlite://library.db")]))
                .unwrap();
        assert_eq!(config.store_uri, "sqlite://library.db");
        assert_eq!(config.collection, "books");
        assert_eq!(config.log_level, super::default_log_level());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn explicit_values_are_normalized() {
        let config = LibraryConfig::from_lookup(lookup(&[
            ("LIBRARY_STORE_URI", " :memory: "),
            ("LIBRARY_COLLECTION", "shelf"),
            ("LIBRARY_LOG_LEVEL", "WARNING"),
        ]))
        .unwrap();
        assert_eq!(config.store_uri, ":memory:");
        assert_eq!(config.collection, "shelf");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn invalid_level_and_relative_log_dir_are_rejected() {
        let err = LibraryConfig::from_lookup(lookup(&[
            ("LIBRARY_STORE_URI", ":memory:"),
            ("LIBRARY_LOG_LEVEL", "loud"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == LOG_LEVEL_VAR));

        let err = LibraryConfig::from_lookup(lookup(&[
            ("LIBRARY_STORE_URI", ":memory:"),
            ("LIBRARY_LOG_DIR", "logs/dev"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == LOG_DIR_VAR));
    }
}
