//! Single-use execution handle: transport call, retry loop, error
//! classification, response parsing and cancellation composition.
//!
//! State machine, one transition per attempt:
//!
//! ```text
//! Created --send()--> Sending
//! Sending --2xx--> Succeeded (terminal)
//! Sending --caller cancel--> Cancelled (terminal)
//! Sending --fatal error--> Failed (terminal)
//! Sending --retryable error, attempts remain--> Sending (after backoff)
//! Sending --retryable error, attempts exhausted--> Failed (terminal)
//! ```
//!
//! `send` consumes the handle, so a terminal handle cannot be resent by
//! construction; the envelope, its stream sources and the transport call
//! are released together when the handle is dropped on any exit path.

use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::body::RequestBody;
use crate::error::{Error, Result};
use crate::logging::LogLevel;
use crate::settings::RequestSettings;

/// Clonable cancel switch for one request handle.
///
/// Obtained from [`RequestHandle::canceller`] before the handle is consumed
/// by `send`, so any task can cancel the in-flight request.
#[derive(Debug, Clone)]
pub struct RequestCanceller {
    token: CancellationToken,
}

impl RequestCanceller {
    /// Fires the caller cancel signal. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the cancel signal has fired.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Executable handle for one frozen request envelope.
///
/// Produced by [`RequestBuilder::build`](crate::builder::RequestBuilder::build);
/// single-use: [`send`](Self::send) consumes it.
#[derive(Debug)]
pub struct RequestHandle {
    body: RequestBody,
    http: Client,
    settings: Arc<RequestSettings>,
    cancel: CancellationToken,
    shutdown: CancellationToken,
}

impl RequestHandle {
    pub(crate) fn new(
        body: RequestBody,
        http: Client,
        settings: Arc<RequestSettings>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            body,
            http,
            settings,
            cancel: CancellationToken::new(),
            shutdown,
        }
    }

    /// The frozen request envelope this handle will send.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Returns a clonable cancel switch for this handle.
    pub fn canceller(&self) -> RequestCanceller {
        RequestCanceller {
            token: self.cancel.clone(),
        }
    }

    /// Fires the caller cancel signal.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Sends the request and parses the response as generic JSON.
    ///
    /// Retries transient failures (5xx, 429, transport errors) against the
    /// configured backoff table; fatal errors propagate immediately. A 2xx
    /// response always yields structured data: plain-text bodies are
    /// wrapped as `{"message": <raw text>}`.
    ///
    /// Explicit caller cancellation resolves as [`Error::Cancelled`], the
    /// process shutdown signal as [`Error::Shutdown`]; neither is retried.
    pub async fn send(self) -> Result<Value> {
        self.log_request();

        let retry = &self.settings.retry;
        let mut attempt: u32 = 1;

        loop {
            match self.attempt().await {
                Ok(value) => {
                    self.log_success(&value);
                    return Ok(value);
                }
                Err(err @ (Error::Cancelled(_) | Error::Shutdown(_))) => {
                    if self.settings.log_gate(LogLevel::Warn) {
                        warn!(
                            method = %self.body.method(),
                            url = %self.body.short_url(),
                            error = %err,
                            "request aborted"
                        );
                    }
                    return Err(err);
                }
                Err(err) if retry.should_retry(&err, attempt) => {
                    let Some(delay) = retry.interval(attempt) else {
                        // Attempts remain but the backoff table is out of
                        // intervals; treat as terminal.
                        self.log_failure(&err);
                        return Err(err);
                    };

                    if self.settings.log_gate(LogLevel::Warn) {
                        warn!(
                            attempt,
                            delay_ms = %delay.as_millis(),
                            error = %err,
                            "transient failure, retry scheduled"
                        );
                    }

                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => {
                            return Err(Error::cancelled("request cancelled during retry wait"));
                        }
                        () = self.shutdown.cancelled() => {
                            return Err(Error::shutdown("host application is shutting down"));
                        }
                        () = tokio::time::sleep(delay) => {}
                    }

                    attempt += 1;
                }
                Err(err) => {
                    self.log_failure(&err);
                    return Err(err);
                }
            }
        }
    }

    /// Sends the request and deserializes the parsed response into `T`.
    ///
    /// A response that decodes as JSON but does not match `T` resolves as
    /// [`Error::Parse`]; that mismatch is deterministic, so it is never
    /// retried.
    pub async fn send_as<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.send().await?;
        serde_json::from_value(value).map_err(Error::parse)
    }

    /// One attempt: dispatch, read, parse, classify.
    async fn attempt(&self) -> Result<Value> {
        let request = self.body.to_request(&self.http)?;

        let response = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                return Err(Error::cancelled("request cancelled by caller"));
            }
            () = self.shutdown.cancelled() => {
                return Err(Error::shutdown("host application is shutting down"));
            }
            result = request.send() => result?,
        };

        let status = response.status();

        let text = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                return Err(Error::cancelled("request cancelled by caller"));
            }
            () = self.shutdown.cancelled() => {
                return Err(Error::shutdown("host application is shutting down"));
            }
            result = response.text() => result?,
        };

        let value = parse_or_wrap(&text);

        if status.is_success() {
            return Ok(value);
        }

        // 5xx and 429 are presumed transient; every other status is a
        // deterministic failure and propagates immediately.
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(Error::server(status.as_u16(), value))
        } else {
            Err(Error::http(status.as_u16(), value))
        }
    }

    fn log_request(&self) {
        if !self.settings.log_gate(LogLevel::Info) {
            return;
        }
        if matches!(*self.body.method(), Method::GET | Method::DELETE) {
            info!(
                method = %self.body.method(),
                url = %self.body.short_url(),
                timeout_ms = %self.body.timeout().as_millis(),
                "request sent"
            );
        } else if self.settings.result_log_gate(LogLevel::Debug) {
            info!(
                method = %self.body.method(),
                url = %self.body.url(),
                timeout_ms = %self.body.timeout().as_millis(),
                format = self.body.payload().kind(),
                headers = %self.body.header_text(),
                body = %self.body.body_text(),
                "request sent"
            );
        } else {
            info!(
                method = %self.body.method(),
                url = %self.body.url(),
                timeout_ms = %self.body.timeout().as_millis(),
                format = self.body.payload().kind(),
                "request sent"
            );
        }
    }

    fn log_success(&self, value: &Value) {
        if !self.settings.log_gate(LogLevel::Info) {
            return;
        }
        if self.settings.result_log_gate(LogLevel::Info) {
            info!(
                method = %self.body.method(),
                url = %self.body.short_url(),
                body = %value,
                "request succeeded"
            );
        } else {
            info!(
                method = %self.body.method(),
                url = %self.body.short_url(),
                "request succeeded"
            );
        }
    }

    fn log_failure(&self, err: &Error) {
        if !self.settings.log_gate(LogLevel::Error) {
            return;
        }
        if self.settings.result_log_gate(LogLevel::Error)
            && let Some(body) = err.response_body()
        {
            error!(
                method = %self.body.method(),
                url = %self.body.short_url(),
                error = %err,
                body = %body,
                "request failed"
            );
        } else {
            error!(
                method = %self.body.method(),
                url = %self.body.short_url(),
                error = %err,
                "request failed"
            );
        }
    }
}

/// Parses response text as JSON, wrapping non-JSON bodies as
/// `{"message": <raw text>}` so callers always receive structured data.
fn parse_or_wrap(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "message": text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_wrap_passes_json_through() {
        let value = parse_or_wrap(r#"{"ok":true}"#);
        assert_eq!(value, serde_json::json!({"ok": true}));
    }

    #[test]
    fn test_parse_or_wrap_wraps_plain_text() {
        let value = parse_or_wrap("service ready");
        assert_eq!(value, serde_json::json!({"message": "service ready"}));
    }

    #[test]
    fn test_parse_or_wrap_wraps_empty_body() {
        let value = parse_or_wrap("");
        assert_eq!(value, serde_json::json!({"message": ""}));
    }

    #[test]
    fn test_canceller_is_idempotent() {
        let token = CancellationToken::new();
        let canceller = RequestCanceller { token };
        assert!(!canceller.is_cancelled());
        canceller.cancel();
        canceller.cancel();
        assert!(canceller.is_cancelled());
    }
}
