//! webreq
//!
//! A configurable HTTP request client: requests are assembled through a
//! fluent builder (method, URL or section-relative path, headers, query
//! parameters, body variant, timeout) and executed through a single-use
//! handle that retries transient failures on a configured backoff schedule,
//! classifies errors, parses responses as generic JSON, and honors
//! cooperative cancellation tied to both the caller and the host process
//! lifetime.
//!
//! # Features
//!
//! - **Fluent builders**: typestate body sub-builders make "wrong content
//!   method for this body type" a compile error, not a runtime check
//! - **Retry discipline**: server errors (5xx, 429) and transport failures
//!   are retried against an ordered backoff interval table
//! - **Cancellation**: every handle composes a caller cancel switch with a
//!   process-shutdown signal; both abort in-flight calls and backoff waits
//! - **Structured results**: 2xx bodies always surface as `serde_json::Value`,
//!   plain-text upstreams are wrapped as `{"message": ...}`
//!
//! # Example
//!
//! ```rust,no_run
//! use webreq::{RequestClient, RequestSettings};
//!
//! # async fn example() -> webreq::Result<()> {
//! let client = RequestClient::new(RequestSettings::default())?;
//!
//! let result = client
//!     .post()
//!     .url("https://api.example.com/login")?
//!     .json_body()
//!     .content("user", "alice")
//!     .content("pass", "secret")
//!     .build()?
//!     .send()
//!     .await?;
//!
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod body;
pub mod builder;
pub mod client;
pub mod error;
pub mod form_data;
pub mod handle;
pub mod logging;
pub mod retry;
pub mod settings;
pub mod shutdown;

pub use body::{BodyPayload, RequestBody, StreamPart, StreamSource};
pub use builder::{FormBody, JsonBody, MultipartBody, NoBody, RequestBuilder};
pub use client::RequestClient;
pub use error::{Error, HttpErrorDetails, NetworkError, Result};
pub use form_data::{FormData, FormDataList};
pub use handle::{RequestCanceller, RequestHandle};
pub use logging::{LogConfig, LogFormat, LogLevel, init_logging, try_init_logging};
pub use retry::RetryPolicy;
pub use settings::{ApiSection, RequestSettings, RequestSettingsBuilder};
pub use shutdown::AppLifetime;

// Re-export CancellationToken for convenient access
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```rust
/// use webreq::prelude::*;
/// ```
pub mod prelude {
    pub use crate::builder::RequestBuilder;
    pub use crate::client::RequestClient;
    pub use crate::error::{Error, Result};
    pub use crate::form_data::FormData;
    pub use crate::handle::{RequestCanceller, RequestHandle};
    pub use crate::logging::{LogConfig, LogFormat, LogLevel, init_logging, try_init_logging};
    pub use crate::retry::RetryPolicy;
    pub use crate::settings::{ApiSection, RequestSettings};
    pub use crate::shutdown::AppLifetime;
    pub use serde_json::Value;
    pub use tokio_util::sync::CancellationToken;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "webreq");
    }
}
