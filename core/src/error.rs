//! Error types for the REST client.
//!
//! # Design
//! A non-2xx status is *not* an error for the verb methods; it is reported
//! through `RestResponse::is_success`. Only `get_string` turns a non-success
//! status into `HttpError`, carrying the reason phrase and raw body so the
//! message is useful on its own. Transport failures and cancellation get
//! their own variants so callers can tell "the server said no" apart from
//! "we never heard back".

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RestError>;

/// Errors returned by `RestClient`, `Endpoint` and the `parse_*` functions.
#[derive(Debug, Error)]
pub enum RestError {
    /// The client configuration is unusable (blank base URL, bad header).
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A successful response carried a body that is not the expected JSON.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// Raised by `get_string` when the server returns a non-2xx status.
    #[error("request failed with status {status} ({reason}): {body}")]
    HttpError {
        status: u16,
        reason: String,
        body: String,
    },

    /// The request never produced a response.
    #[error(transparent)]
    TransportError(#[from] TransportError),

    /// The caller's cancellation token fired before the response arrived.
    #[error("request was cancelled")]
    Cancelled,
}

/// Failures raised by a `Transport` implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        // The URL may carry credentials in its query string.
        let value = value.without_url();
        if value.is_timeout() {
            TransportError::Timeout(value.to_string())
        } else if value.is_connect() {
            TransportError::Connect(value.to_string())
        } else {
            TransportError::Other(value.to_string())
        }
    }
}
