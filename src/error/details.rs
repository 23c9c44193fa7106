//! Detail payload for HTTP status errors.

use serde_json::Value;

/// Details for an HTTP error response.
///
/// Extracted to a separate struct and boxed to keep the `Error` enum size
/// small. Carries the status code and the parsed response body so a failure
/// can be diagnosed without re-running the request.
#[derive(Debug)]
#[non_exhaustive]
pub struct HttpErrorDetails {
    /// HTTP status code of the failed response.
    pub status: u16,
    /// Response body, parsed as JSON where possible (plain-text bodies are
    /// wrapped as `{"message": ...}` like successful responses).
    pub body: Value,
}

impl HttpErrorDetails {
    /// Creates new error details from a status code and parsed body.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Returns a short preview of the response body for log lines.
    pub fn body_preview(&self) -> String {
        const PREVIEW_SIZE: usize = 200;
        let text = self.body.to_string();
        text.chars().take(PREVIEW_SIZE).collect()
    }
}

impl std::fmt::Display for HttpErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.body_preview())
    }
}
