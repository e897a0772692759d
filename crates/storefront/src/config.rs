//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BOUTIQUE_DATA_DIR` - Root of the file-backed storage origin (default: .boutique)
//! - `BOUTIQUE_CHECKOUT_DELAY_MS` - Simulated checkout delay (default: 1000)
//! - `BOUTIQUE_POLL_INTERVAL_MS` - Cross-context polling period (default: 500)
//! - `BOUTIQUE_LOG_JSON` - Emit JSON log lines (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".boutique";
const DEFAULT_CHECKOUT_DELAY_MS: u64 = 1000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoutiqueConfig {
    /// Directory holding the storage origin
    pub data_dir: PathBuf,
    /// How long the simulated checkout takes
    pub checkout_delay: Duration,
    /// How often to look for writes from other contexts
    pub poll_interval: Duration,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for BoutiqueConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            checkout_delay: Duration::from_millis(DEFAULT_CHECKOUT_DELAY_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl BoutiqueConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = lookup("BOUTIQUE_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let checkout_delay = get_millis(
            &lookup,
            "BOUTIQUE_CHECKOUT_DELAY_MS",
            DEFAULT_CHECKOUT_DELAY_MS,
        )?;
        let poll_interval =
            get_millis(&lookup, "BOUTIQUE_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "BOUTIQUE_POLL_INTERVAL_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let log_json = get_bool(&lookup, "BOUTIQUE_LOG_JSON")?;

        Ok(Self {
            data_dir,
            checkout_delay,
            poll_interval,
            log_json,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a millisecond duration, falling back to a default when unset.
fn get_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_millis(default));
    };
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag; unset means `false`.
fn get_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<BoutiqueConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        BoutiqueConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, BoutiqueConfig::default());
        assert_eq!(config.checkout_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BOUTIQUE_DATA_DIR", "/tmp/shop"),
            ("BOUTIQUE_CHECKOUT_DELAY_MS", "250"),
            ("BOUTIQUE_POLL_INTERVAL_MS", " 100 "),
            ("BOUTIQUE_LOG_JSON", "TRUE"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/shop"));
        assert_eq!(config.checkout_delay, Duration::from_millis(250));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert!(config.log_json);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_delay() {
        let err = load(&[("BOUTIQUE_CHECKOUT_DELAY_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "BOUTIQUE_CHECKOUT_DELAY_MS"));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        assert!(load(&[("BOUTIQUE_POLL_INTERVAL_MS", "0")]).is_err());
    }

    #[test]
    fn test_invalid_bool() {
        assert!(load(&[("BOUTIQUE_LOG_JSON", "maybe")]).is_err());
    }

    #[test]
    fn test_empty_sentry_dsn_is_unset() {
        let config = load(&[("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.sentry_dsn, None);
    }
}
