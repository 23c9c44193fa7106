//! Structured logging system.
//!
//! Provides tracing-based structured logging with support for:
//! - Multi-level logging with an explicit `Off` gate
//! - Structured fields
//! - Environment variable configuration
//! - JSON and formatted output
//!
//! The same [`LogLevel`] type also drives the request-lifecycle log gates in
//! [`RequestSettings`](crate::settings::RequestSettings): the engine checks
//! the gate before building any log string.

use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log level.
///
/// Ordered by verbosity: `Off < Error < Warn < Info < Debug < Trace`.
/// A gate configured at `Info` accepts `Error`, `Warn` and `Info` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Logging disabled.
    Off,
    /// Error level: error information only.
    Error,
    /// Warn level: potential issues.
    Warn,
    /// Info level: important lifecycle events.
    Info,
    /// Debug level: detailed debugging information.
    Debug,
    /// Trace level: most detailed debugging information.
    Trace,
}

impl LogLevel {
    /// Returns `true` when a message at `level` passes a gate configured at
    /// `self`.
    pub fn accepts(self, level: LogLevel) -> bool {
        level != LogLevel::Off && self >= level
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Off => write!(f, "off"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable formatted output.
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON output for log aggregation.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level emitted by the subscriber.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Whether to show thread IDs.
    pub show_thread_ids: bool,
    /// Whether to show the event target.
    pub show_target: bool,
    /// Whether to emit span enter/close events.
    pub show_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            show_thread_ids: false,
            show_target: true,
            show_span_events: false,
        }
    }
}

impl LogConfig {
    /// Configuration suitable for local development: pretty output at debug
    /// level with span events.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            show_thread_ids: true,
            show_target: true,
            show_span_events: true,
        }
    }

    /// Configuration suitable for production: JSON output at info level.
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            show_thread_ids: false,
            show_target: true,
            show_span_events: false,
        }
    }
}

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("webreq={}", config.level)))
}

/// Initializes the global logging subscriber.
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_logging`] in tests.
///
/// # Example
///
/// ```rust,no_run
/// use webreq::logging::{LogConfig, init_logging};
///
/// init_logging(&LogConfig::development());
/// ```
pub fn init_logging(config: &LogConfig) {
    let filter = env_filter(config);

    match config.format {
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(config.show_thread_ids)
                .with_target(config.show_target)
                .with_span_events(span_events(config))
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_thread_ids(config.show_thread_ids)
                .with_target(config.show_target)
                .with_span_events(span_events(config))
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).init();
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_thread_ids(config.show_thread_ids)
                .with_target(config.show_target)
                .with_span_events(span_events(config))
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).init();
        }
    }
}

/// Attempts to initialize the logging subscriber, ignoring duplicate
/// initialization errors. Suitable for test environments.
pub fn try_init_logging(config: &LogConfig) {
    let filter = env_filter(config);

    let result = match config.format {
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(config.show_thread_ids)
                .with_target(config.show_target)
                .with_span_events(span_events(config))
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_thread_ids(config.show_thread_ids)
                .with_target(config.show_target)
                .with_span_events(span_events(config))
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_thread_ids(config.show_thread_ids)
                .with_target(config.show_target)
                .with_span_events(span_events(config))
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
    };

    // A second init in the same process is fine for tests.
    let _ = result;
}

fn span_events(config: &LogConfig) -> FmtSpan {
    if config.show_span_events {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace > LogLevel::Debug);
        assert!(LogLevel::Debug > LogLevel::Info);
        assert!(LogLevel::Info > LogLevel::Warn);
        assert!(LogLevel::Warn > LogLevel::Error);
        assert!(LogLevel::Error > LogLevel::Off);
    }

    #[test]
    fn test_gate_accepts() {
        assert!(LogLevel::Info.accepts(LogLevel::Error));
        assert!(LogLevel::Info.accepts(LogLevel::Info));
        assert!(!LogLevel::Info.accepts(LogLevel::Debug));
        assert!(!LogLevel::Off.accepts(LogLevel::Error));
        // Off-level messages never pass, whatever the gate.
        assert!(!LogLevel::Trace.accepts(LogLevel::Off));
    }

    #[test]
    fn test_level_display() {
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Off.to_string(), "off");
    }

    #[test]
    fn test_try_init_is_idempotent() {
        try_init_logging(&LogConfig::default());
        try_init_logging(&LogConfig::default());
    }
}
