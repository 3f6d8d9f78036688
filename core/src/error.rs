//! Error types for the taskboard client.
//!
//! # Design
//! The taxonomy is deliberately small: a request either never reached the
//! server (`Network`), reached it and came back non-2xx (`Server`), or failed
//! locally before or after the round-trip (`Validation` and the two codec
//! variants). Nothing here is retried.

use thiserror::Error;

/// Errors returned by `ApiClient`, `RemoteApi` and the store's mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A required field was missing or out of range; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request could not be delivered or the response could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    ///
    /// `message` is the `error` field of a JSON error body when the server
    /// sent one, otherwise the raw body.
    #[error("server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Server { status: 404, .. })
    }
}

/// Errors raised while reading `ClientConfig` from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidBaseUrl { var: &'static str, value: String },
}

/// Returned by the `FromStr` impls of the wire enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?} (expected one of {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}
