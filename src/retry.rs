//! Retry policy: attempt budget and ordered backoff interval table.

use std::time::Duration;

use crate::error::Error;

/// Retry policy read from settings.
///
/// `max_attempts` is the total number of attempts (the first send included);
/// `backoff_ms` is an ordered table of waits applied between attempts.
/// When the table runs out before the attempt budget does, the attempt is
/// treated as terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, first send included. `0` behaves as a
    /// single attempt with no retries.
    pub max_attempts: u32,
    /// Backoff intervals in milliseconds; entry `n` is the wait after
    /// attempt `n + 1` fails.
    pub backoff_ms: Vec<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: vec![400, 800, 1600, 3200, 6400, 12800, 25600],
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with an explicit attempt budget and backoff table.
    pub fn new(max_attempts: u32, backoff_ms: impl Into<Vec<u64>>) -> Self {
        Self {
            max_attempts,
            backoff_ms: backoff_ms.into(),
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: Vec::new(),
        }
    }

    /// Returns the backoff interval after failed attempt `attempt`
    /// (1-based), or `None` when no further backoff is defined and the
    /// attempt should be treated as terminal.
    pub fn interval(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let index = usize::try_from(attempt - 1).ok()?;
        self.backoff_ms
            .get(index)
            .copied()
            .map(Duration::from_millis)
    }

    /// Returns `true` when `error` is retryable-classified and attempt
    /// `attempt` (1-based) leaves budget for another try.
    pub fn should_retry(&self, error: &Error, attempt: u32) -> bool {
        error.is_retryable() && attempt < self.max_attempts
    }
}
