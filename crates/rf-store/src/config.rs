//! Rule store client configuration.

use std::time::Duration;

use url::Url;

use crate::StoreError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// API root; rule paths such as `rules/3/` are joined onto it.
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl StoreConfig {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Build from environment variables:
    /// - `RULEFLOW_API_URL` (default `http://127.0.0.1:8000/`)
    /// - `RULEFLOW_REQUEST_TIMEOUT_MS` (default 30000)
    pub fn from_env() -> Result<Self, StoreError> {
        let base_url = std::env::var("RULEFLOW_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let timeout_ms: u64 = match std::env::var("RULEFLOW_REQUEST_TIMEOUT_MS") {
            Ok(raw) => raw.parse().map_err(|e| {
                StoreError::Config(format!("invalid RULEFLOW_REQUEST_TIMEOUT_MS: {e}"))
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
        };
        Ok(Self {
            base_url: parse_base_url(&base_url)?,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Parse and force a trailing slash so relative joins append instead of
/// replacing the last path segment.
fn parse_base_url(raw: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| StoreError::Config(format!("invalid base url '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(StoreError::Config(format!("base url '{raw}' cannot be a base")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
