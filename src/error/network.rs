//! Network-related error types.

use std::error::Error as StdError;
use thiserror::Error;

/// Encapsulated network errors hiding implementation details.
///
/// This type wraps all transport-level failures without exposing third-party
/// library types (like `reqwest::Error`) in the public API, so the API stays
/// stable even if the underlying HTTP library changes.
///
/// All variants are presumed transient and retried per the configured
/// backoff policy, except when the failure was triggered by an explicit
/// cancellation (which never reaches this type).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NetworkError {
    /// Request timed out (per-request timeout expiry, not caller cancel).
    #[error("Request timeout")]
    Timeout,

    /// Connection failed (refused, reset, TLS handshake).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// DNS resolution failed.
    #[error("DNS resolution failed: {0}")]
    Dns(String),

    /// Opaque transport error for underlying issues.
    /// Uses `Box<dyn StdError>` to hide implementation details while
    /// preserving the source for downcast.
    #[error("Transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync + 'static>),
}
