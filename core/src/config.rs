//! Client configuration.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const BASE_URL_VAR: &str = "TASKBOARD_API_URL";
pub const TIMEOUT_VAR: &str = "TASKBOARD_TIMEOUT_SECS";

/// Where the API lives and how long a request may take.
///
/// `timeout` is `None` by default: requests wait until the server answers
/// or the connection drops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `TASKBOARD_API_URL` and `TASKBOARD_TIMEOUT_SECS`, falling back
    /// to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(BASE_URL_VAR, &base_url)?;
        let timeout = match lookup(TIMEOUT_VAR) {
            Some(value) => Some(parse_timeout(TIMEOUT_VAR, &value)?),
            None => None,
        };
        Ok(Self { base_url, timeout })
    }
}

/// Check that `value` is an absolute http(s) URL.
pub fn parse_base_url(var: &'static str, value: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl {
        var,
        value: value.to_string(),
    };
    let parsed = url::Url::parse(value).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(value.to_string())
}

pub fn parse_timeout(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidTimeout {
            var,
            value: value.to_string(),
        })
}
