//! Request settings: an explicit, read-only configuration object.
//!
//! The hosting application constructs [`RequestSettings`] once (directly,
//! with struct-update syntax, or through [`RequestSettingsBuilder`]) and
//! hands it to [`RequestClient`](crate::client::RequestClient). The core
//! only ever reads these values; nothing here is loaded lazily or mutated
//! behind the caller's back.

use std::time::Duration;

use crate::form_data::FormData;
use crate::logging::LogLevel;
use crate::retry::RetryPolicy;

/// A named API domain/version profile supplying a base URL and default
/// headers for relative-path requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSection {
    /// Section name used for lookup.
    pub name: String,
    /// Base URL the relative path is appended to, e.g.
    /// `https://api.example.com/v2`.
    pub base_url: String,
    /// Default headers auto-filled for requests in this section.
    pub headers: Vec<FormData>,
}

impl ApiSection {
    /// Creates a section with no default headers.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            headers: Vec::new(),
        }
    }

    /// Adds a default header to the section.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(FormData::new(key, value));
        self
    }
}

/// Read-only settings consumed by the builder and the execution engine.
///
/// Shared across concurrent handles via `Arc`; safe for concurrent reads
/// because nothing in the core mutates it.
#[derive(Debug, Clone)]
pub struct RequestSettings {
    /// Gate for request-lifecycle log lines (sent, retry, success, fail).
    pub logging_level: LogLevel,
    /// Gate for including the full parsed body in success/failure lines.
    pub result_logging_level: LogLevel,
    /// Whether JSON body text is validated before send.
    pub check_json_before_send: bool,
    /// Whether non-https targets are rejected at build time.
    pub force_https_scheme: bool,
    /// Whether a timestamp header is auto-injected at build time.
    pub add_time_in_header: bool,
    /// Header key used for the auto-injected timestamp (Unix epoch millis).
    pub time_key: String,
    /// Default per-request timeout applied when the builder leaves the
    /// timeout unset.
    pub request_timeout: Duration,
    /// Timeout applied by `long_request()`.
    pub long_request_timeout: Duration,
    /// Retry attempt budget and backoff interval table.
    pub retry: RetryPolicy,
    /// Headers auto-filled on every request outside a named section.
    pub default_headers: Vec<FormData>,
    /// Named API sections.
    pub sections: Vec<ApiSection>,
    /// Section applied when the builder names none and the target is a
    /// relative path.
    pub default_section: Option<String>,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            logging_level: LogLevel::Info,
            result_logging_level: LogLevel::Debug,
            check_json_before_send: false,
            force_https_scheme: true,
            add_time_in_header: true,
            time_key: "Time".to_string(),
            request_timeout: Duration::from_millis(3000),
            long_request_timeout: Duration::from_millis(15000),
            retry: RetryPolicy::default(),
            default_headers: vec![FormData::new("User-Agent", "Mozilla/5.0")],
            sections: Vec::new(),
            default_section: None,
        }
    }
}

impl RequestSettings {
    /// Returns a fluent builder seeded with the defaults.
    pub fn builder() -> RequestSettingsBuilder {
        RequestSettingsBuilder {
            settings: Self::default(),
        }
    }

    /// Looks up a named section.
    pub fn section(&self, name: &str) -> Option<&ApiSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// The configured default section, when one is named and registered.
    pub fn fallback_section(&self) -> Option<&ApiSection> {
        self.default_section
            .as_deref()
            .and_then(|name| self.section(name))
    }

    /// Base URL of the default section.
    pub fn api_url(&self) -> Option<&str> {
        self.fallback_section().map(|s| s.base_url.as_str())
    }

    /// Returns `true` when a lifecycle log line at `level` should be built.
    pub fn log_gate(&self, level: LogLevel) -> bool {
        self.logging_level.accepts(level)
    }

    /// Returns `true` when the full parsed body should be included in
    /// success/failure log lines.
    pub fn result_log_gate(&self, level: LogLevel) -> bool {
        self.result_logging_level.accepts(level)
    }
}

/// Fluent builder for [`RequestSettings`].
#[derive(Debug, Clone)]
pub struct RequestSettingsBuilder {
    settings: RequestSettings,
}

impl RequestSettingsBuilder {
    /// Sets the lifecycle logging gate.
    pub fn logging_level(mut self, level: LogLevel) -> Self {
        self.settings.logging_level = level;
        self
    }

    /// Sets the result-body logging gate.
    pub fn result_logging_level(mut self, level: LogLevel) -> Self {
        self.settings.result_logging_level = level;
        self
    }

    /// Enables or disables JSON pre-validation.
    pub fn check_json_before_send(mut self, check: bool) -> Self {
        self.settings.check_json_before_send = check;
        self
    }

    /// Enables or disables the mandatory-https policy.
    pub fn force_https_scheme(mut self, force: bool) -> Self {
        self.settings.force_https_scheme = force;
        self
    }

    /// Enables or disables the auto-injected timestamp header and sets its
    /// key.
    pub fn time_header(mut self, enabled: bool, key: impl Into<String>) -> Self {
        self.settings.add_time_in_header = enabled;
        self.settings.time_key = key.into();
        self
    }

    /// Sets the default per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.settings.request_timeout = timeout;
        self
    }

    /// Sets the long-request timeout.
    pub fn long_request_timeout(mut self, timeout: Duration) -> Self {
        self.settings.long_request_timeout = timeout;
        self
    }

    /// Sets the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.settings.retry = retry;
        self
    }

    /// Replaces the auto-fill header table.
    pub fn default_headers(mut self, headers: Vec<FormData>) -> Self {
        self.settings.default_headers = headers;
        self
    }

    /// Registers a named API section.
    pub fn section(mut self, section: ApiSection) -> Self {
        self.settings.sections.push(section);
        self
    }

    /// Names the section applied to relative targets when the builder
    /// selects none.
    pub fn default_section(mut self, name: impl Into<String>) -> Self {
        self.settings.default_section = Some(name.into());
        self
    }

    /// Finalizes the settings.
    pub fn build(self) -> RequestSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_profile() {
        let settings = RequestSettings::default();
        assert_eq!(settings.request_timeout, Duration::from_millis(3000));
        assert_eq!(settings.long_request_timeout, Duration::from_millis(15000));
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.retry.backoff_ms[0], 400);
        assert!(settings.force_https_scheme);
        assert!(settings.add_time_in_header);
        assert_eq!(settings.time_key, "Time");
        assert_eq!(settings.default_headers[0].key(), "User-Agent");
    }

    #[test]
    fn test_section_lookup() {
        let settings = RequestSettings::builder()
            .section(
                ApiSection::new("auth", "https://auth.example.com/v1")
                    .with_header("X-Client", "webreq"),
            )
            .build();

        let section = settings.section("auth").unwrap();
        assert_eq!(section.base_url, "https://auth.example.com/v1");
        assert_eq!(section.headers[0].key(), "X-Client");
        assert!(settings.section("missing").is_none());
    }

    #[test]
    fn test_default_section_drives_api_url() {
        let settings = RequestSettings::builder()
            .section(ApiSection::new("main", "https://api.example.com/v3"))
            .default_section("main")
            .build();
        assert_eq!(settings.api_url(), Some("https://api.example.com/v3"));

        let settings = RequestSettings::builder().default_section("ghost").build();
        assert!(settings.fallback_section().is_none());
        assert!(settings.api_url().is_none());
    }

    #[test]
    fn test_log_gates() {
        let settings = RequestSettings::builder()
            .logging_level(LogLevel::Warn)
            .result_logging_level(LogLevel::Off)
            .build();

        assert!(settings.log_gate(LogLevel::Error));
        assert!(settings.log_gate(LogLevel::Warn));
        assert!(!settings.log_gate(LogLevel::Info));
        assert!(!settings.result_log_gate(LogLevel::Error));
    }
}
