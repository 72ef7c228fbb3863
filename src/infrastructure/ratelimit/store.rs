//! Counter store trait and error types for fixed-window rate limiting.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while touching the counter backend.
///
/// Unlike cache errors these are not fail-open: a limiter that cannot count
/// must surface a storage failure rather than silently admit or refuse.
#[derive(Debug, Error)]
pub enum RateStoreError {
    #[error("Counter store connection error: {0}")]
    Connection(String),

    #[error("Counter store operation error: {0}")]
    Operation(String),
}

/// Counter state immediately after an increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    /// Requests observed in the current window, including this one.
    pub count: u64,
    /// Time remaining until the window resets.
    pub resets_in: Duration,
}

/// Trait for per-identity request counters with window expiry.
///
/// One call covers the whole admission step: create the counter with an
/// expiry of `window` if it does not exist, then increment it. Both backends
/// guarantee that concurrent calls for one key each observe a distinct count.
///
/// # Implementations
///
/// - [`crate::infrastructure::ratelimit::RedisCounterStore`] - shared counters across instances
/// - [`crate::infrastructure::ratelimit::MemoryCounterStore`] - per-process counters
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increments the counter for `key`, creating it with a `window` expiry
    /// on first sight.
    ///
    /// # Errors
    ///
    /// Returns [`RateStoreError`] when the backend cannot be reached or the
    /// increment fails.
    async fn incr_in_window(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<WindowCount, RateStoreError>;
}
