//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `KASSE_PRODUCT_URL` - Product feed URL used to seed the persisted
//!   source on first launch (subsequently the persisted value wins)
//! - `KASSE_STATE_PATH` - Path of the JSON settings file
//!   (default: `kasse-state.json`)
//! - `KASSE_HTTP_TIMEOUT_SECS` - Product feed request timeout in seconds
//!   (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_STATE_PATH: &str = "kasse-state.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// POS client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Feed URL to seed the persisted source with on first launch.
    pub product_url: Option<String>,
    /// Where the JSON settings file lives.
    pub state_path: PathBuf,
    /// Timeout for product feed requests.
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let product_url = std::env::var("KASSE_PRODUCT_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let state_path = std::env::var("KASSE_STATE_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH), PathBuf::from);

        let http_timeout = match std::env::var("KASSE_HTTP_TIMEOUT_SECS") {
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            Ok(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "KASSE_HTTP_TIMEOUT_SECS".to_owned(),
                        e.to_string(),
                    )
                })?,
        };

        Ok(Self {
            product_url,
            state_path,
            http_timeout,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            product_url: None,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.product_url, None);
        assert_eq!(config.state_path, PathBuf::from("kasse-state.json"));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }
}
