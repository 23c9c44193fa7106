//! Process-lifetime cancellation signal.
//!
//! The hosting application owns one [`AppLifetime`] and fires it when it
//! begins shutting down; every in-flight request handle observes the signal
//! alongside its own caller-cancel switch. Firing aborts in-flight network
//! calls and pending backoff waits.

use tokio_util::sync::CancellationToken;

/// Handle to the host application's shutdown signal.
///
/// Cheap to clone; all clones share one underlying token. The signal fires
/// at most once and never resets.
#[derive(Debug, Clone, Default)]
pub struct AppLifetime {
    root: CancellationToken,
}

impl AppLifetime {
    /// Creates a fresh lifetime signal, not yet fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an externally owned token, e.g. one already wired to a signal
    /// handler.
    pub fn from_token(root: CancellationToken) -> Self {
        Self { root }
    }

    /// Fires the shutdown signal. Idempotent.
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    /// Returns `true` once the signal has fired.
    pub fn is_shutting_down(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Returns a clone of the underlying token for direct observation.
    pub fn token(&self) -> CancellationToken {
        self.root.clone()
    }

    /// Returns a token that fires when either `caller` fires or the process
    /// begins shutdown.
    ///
    /// The engine observes the two sources separately to keep the
    /// caller/shutdown distinction; this composition exists for callers that
    /// only need one combined stop signal.
    pub fn linked(&self, caller: &CancellationToken) -> CancellationToken {
        let linked = CancellationToken::new();
        let out = linked.clone();
        let caller = caller.clone();
        let shutdown = self.root.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = caller.cancelled() => linked.cancel(),
                () = shutdown.cancelled() => linked.cancel(),
                () = linked.cancelled() => {}
            }
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_fires_once_for_all_clones() {
        let lifetime = AppLifetime::new();
        let clone = lifetime.clone();
        assert!(!clone.is_shutting_down());

        lifetime.shutdown();
        assert!(clone.is_shutting_down());
        assert!(clone.token().is_cancelled());

        // Idempotent.
        lifetime.shutdown();
        assert!(lifetime.is_shutting_down());
    }

    #[tokio::test]
    async fn test_linked_token_fires_on_caller_cancel() {
        let lifetime = AppLifetime::new();
        let caller = CancellationToken::new();
        let linked = lifetime.linked(&caller);

        caller.cancel();
        tokio::time::timeout(Duration::from_secs(1), linked.cancelled())
            .await
            .expect("linked token should fire when the caller fires");
        assert!(!lifetime.is_shutting_down());
    }

    #[tokio::test]
    async fn test_linked_token_fires_on_shutdown() {
        let lifetime = AppLifetime::new();
        let caller = CancellationToken::new();
        let linked = lifetime.linked(&caller);

        lifetime.shutdown();
        tokio::time::timeout(Duration::from_secs(1), linked.cancelled())
            .await
            .expect("linked token should fire on shutdown");
        assert!(!caller.is_cancelled());
    }
}
