//! Client configuration

use crate::error::{ClientError, Result};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Configuration shared by the product and session clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront backend, without trailing slash
    pub api_url: String,

    /// Retries after the first failed product request (no backoff)
    /// Default: 3
    pub retry_attempts: u32,

    /// Polling cadence
    /// Default: 1 second
    pub poll_interval: Duration,

    /// Quiet period before a search term is applied
    /// Default: 300 milliseconds
    pub search_debounce: Duration,

    /// Per-request timeout for the HTTP client
    /// Default: 10 seconds
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Build a config from `STOREFRONT_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("STOREFRONT_API_URL") {
            Ok(url) => Self::new(url),
            Err(_) => Self::default(),
        };

        if let Some(v) = env_parse::<u32>("STOREFRONT_RETRY_ATTEMPTS")? {
            config.retry_attempts = v;
        }
        if let Some(ms) = env_parse::<u64>("STOREFRONT_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("STOREFRONT_SEARCH_DEBOUNCE_MS")? {
            config.search_debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("STOREFRONT_REQUEST_TIMEOUT_MS")? {
            config.request_timeout = Duration::from_millis(ms);
        }

        if config.poll_interval.is_zero() {
            return Err(ClientError::Configuration(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    /// Absolute URL for `path` on the configured backend
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            retry_attempts: 3,
            poll_interval: Duration::from_secs(1),
            search_debounce: Duration::from_millis(300),
            request_timeout: Duration::from_secs(10),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ClientError::Configuration(format!("{key}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}
