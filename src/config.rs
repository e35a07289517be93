//! Session configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STOREFRONT_WHATSAPP_NUMBER` - Recipient of order summaries (digits are kept)
//! - `STOREFRONT_CONFIRM_DEBOUNCE_MS` - Delay before the confirmation prompt (default: 500)
//! - `STOREFRONT_CONFIRM_TIMEOUT_SECS` - Wait for the user to return (default: 300)
//! - `STOREFRONT_PREFERENCES_PATH` - JSON file holding the theme preference
//! - `DATABASE_URL` - Postgres connection string for catalog and profiles

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use crate::checkout::{ConfirmationPolicy, DEFAULT_DEBOUNCE, DEFAULT_TIMEOUT};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub whatsapp_number: Option<String>,
    pub confirmation: ConfirmationPolicy,
    pub preferences_path: Option<PathBuf>,
    pub database_url: Option<String>,
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let debounce_ms: u64 = parse_or(var("STOREFRONT_CONFIRM_DEBOUNCE_MS"), "STOREFRONT_CONFIRM_DEBOUNCE_MS", millis(DEFAULT_DEBOUNCE))?;
        let timeout_secs: u64 = parse_or(var("STOREFRONT_CONFIRM_TIMEOUT_SECS"), "STOREFRONT_CONFIRM_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar("STOREFRONT_CONFIRM_TIMEOUT_SECS".into(), "must be greater than zero".into()));
        }

        let config = Self {
            whatsapp_number: var("STOREFRONT_WHATSAPP_NUMBER"),
            confirmation: ConfirmationPolicy { debounce: Duration::from_millis(debounce_ms), timeout: Duration::from_secs(timeout_secs) },
            preferences_path: var("STOREFRONT_PREFERENCES_PATH").map(PathBuf::from),
            database_url: var("DATABASE_URL"),
        };
        tracing::debug!(
            debounce_ms, timeout_secs,
            whatsapp = config.whatsapp_number.is_some(),
            database = config.database_url.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }
}

fn millis(d: Duration) -> u64 { u64::try_from(d.as_millis()).unwrap_or(u64::MAX) }

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), format!("{raw:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.confirmation.debounce, Duration::from_millis(500));
        assert_eq!(config.confirmation.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("STOREFRONT_CONFIRM_DEBOUNCE_MS", "250"),
            ("STOREFRONT_CONFIRM_TIMEOUT_SECS", "60"),
            ("STOREFRONT_WHATSAPP_NUMBER", "5511999990000"),
            ("STOREFRONT_PREFERENCES_PATH", " "),
        ])).unwrap();
        assert_eq!(config.confirmation.debounce, Duration::from_millis(250));
        assert_eq!(config.confirmation.timeout, Duration::from_secs(60));
        assert_eq!(config.whatsapp_number.as_deref(), Some("5511999990000"));
        assert_eq!(config.preferences_path, None);
    }

    #[test]
    fn test_invalid_numbers() {
        let err = Config::from_lookup(lookup(&[("STOREFRONT_CONFIRM_DEBOUNCE_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_CONFIRM_DEBOUNCE_MS"));
        assert!(Config::from_lookup(lookup(&[("STOREFRONT_CONFIRM_TIMEOUT_SECS", "0")])).is_err());
    }
}
