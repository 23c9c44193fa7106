//! Error taxonomy for request building and execution.
//!
//! The classification drives the retry loop:
//!
//! ```text
//! Error
//! ├── Validation  - builder-time failures, never sent, never retried
//! ├── Config      - unusable settings or client construction failure
//! ├── Http        - fatal HTTP status (4xx other than 429), not retried
//! ├── Server      - retryable HTTP status (5xx, 429)
//! ├── Network     - retryable transport failures (via NetworkError)
//! ├── Parse       - typed decode failure on a successful response, fatal
//! ├── Cancelled   - caller invoked cancel, terminal, dedicated kind
//! └── Shutdown    - host process lifetime fired, terminal
//! ```
//!
//! `Cancelled` is deliberately distinct from every other termination so
//! callers can branch on "did I cancel this" without string matching.

mod details;
mod network;


use std::borrow::Cow;
use thiserror::Error;

pub use details::HttpErrorDetails;
pub use network::NetworkError;

/// Result type alias for all webreq operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type for the `webreq` library.
///
/// Large variants are boxed to keep the enum small; messages use
/// `Cow<'static, str>` to avoid allocation for static strings.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid builder input: bad URL, unknown section, invalid JSON body,
    /// missing stream source. Raised synchronously before any network call.
    #[error("Validation error: {0}")]
    Validation(Cow<'static, str>),

    /// Unusable configuration or HTTP client construction failure.
    #[error("Configuration error: {0}")]
    Config(Cow<'static, str>),

    /// Fatal HTTP error response (4xx other than 429). Not retried.
    #[error("HTTP error: {0}")]
    Http(Box<HttpErrorDetails>),

    /// Retryable HTTP error response (5xx or 429).
    #[error("Server error: {0}")]
    Server(Box<HttpErrorDetails>),

    /// Transport-level failure. Retryable.
    #[error("Network error: {0}")]
    Network(Box<NetworkError>),

    /// Response decoded fine as JSON but failed to deserialize into the
    /// requested type. Fatal: indicates a protocol mismatch, not a blip.
    #[error("Response parse error: {0}")]
    Parse(#[source] Box<serde_json::Error>),

    /// The caller's own cancel switch fired. Terminal, never retried.
    #[error("Cancelled: {0}")]
    Cancelled(Cow<'static, str>),

    /// The host process lifetime signal fired. Terminal, never retried.
    #[error("Shutting down: {0}")]
    Shutdown(Cow<'static, str>),
}

impl Error {
    /// Creates a validation error.
    /// Accepts both `&'static str` (zero allocation) and `String`.
    pub fn validation(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a fatal HTTP error from a status code and parsed body.
    pub fn http(status: u16, body: serde_json::Value) -> Self {
        Self::Http(Box::new(HttpErrorDetails::new(status, body)))
    }

    /// Creates a retryable server error from a status code and parsed body.
    pub fn server(status: u16, body: serde_json::Value) -> Self {
        Self::Server(Box::new(HttpErrorDetails::new(status, body)))
    }

    /// Creates a network error from a message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(Box::new(NetworkError::ConnectionFailed(msg.into())))
    }

    /// Creates a timeout error.
    pub fn timeout() -> Self {
        Self::Network(Box::new(NetworkError::Timeout))
    }

    /// Creates a parse error from a `serde_json` failure.
    pub fn parse(err: serde_json::Error) -> Self {
        Self::Parse(Box::new(err))
    }

    /// Creates a cancelled error.
    pub fn cancelled(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Creates a shutdown error.
    pub fn shutdown(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Shutdown(msg.into())
    }

    /// Returns `true` when the error is presumed transient and eligible for
    /// a retry attempt: server errors (5xx, 429) and transport failures.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server(_) | Self::Network(_))
    }

    /// Returns the HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(details) | Self::Server(details) => Some(details.status),
            _ => None,
        }
    }

    /// Returns the parsed response body carried by the error, if any.
    pub fn response_body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Http(details) | Self::Server(details) => Some(&details.body),
            _ => None,
        }
    }

    /// Returns the cancellation message when the caller cancelled this
    /// request, `None` for every other termination.
    pub fn as_cancelled(&self) -> Option<&str> {
        match self {
            Self::Cancelled(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(Box::new(NetworkError::Timeout))
        } else if let Some(message) = dns_failure_message(&err) {
            Self::Network(Box::new(NetworkError::Dns(message)))
        } else if err.is_connect() {
            Self::Network(Box::new(NetworkError::ConnectionFailed(err.to_string())))
        } else {
            Self::Network(Box::new(NetworkError::Transport(Box::new(err))))
        }
    }
}

/// Walks the source chain looking for the resolver failure text hyper
/// reports on unresolvable hosts. reqwest folds DNS errors into its
/// connect errors, so the chain is the only place the distinction survives.
fn dns_failure_message(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return Some(text);
        }
        source = inner.source();
    }
    None
}
