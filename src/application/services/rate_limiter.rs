//! Fixed-window rate limiting service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, error};

use crate::error::AppError;
use crate::infrastructure::ratelimit::{CounterStore, WindowCount};

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request fits in the current window.
    Allowed { remaining: u64 },
    /// The window is exhausted; retry once it resets.
    Limited { retry_after: Duration },
}

/// Fixed-window request limiter keyed by caller identity.
///
/// Each admission atomically increments the identity's counter for the
/// current window and compares the post-increment count against the limit.
/// The window TTL is set once at counter creation, so bursts that straddle a
/// window boundary can reach twice the limit in quick succession. That is
/// the accepted cost of O(1) admission over sliding-window bookkeeping.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    limit: u64,
    window: Duration,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(store: Arc<dyn CounterStore>, limit: u64, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    /// Checks whether a request from `identity` fits in the current window.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the counter store fails. A broken
    /// store never silently admits or rejects.
    pub async fn admit(&self, identity: &str) -> Result<Admission, AppError> {
        let WindowCount { count, resets_in } = self
            .store
            .incr_in_window(identity, self.window)
            .await
            .map_err(|e| {
                error!("Rate limit store error for {}: {}", identity, e);
                AppError::internal("Storage failure", json!({}))
            })?;

        if count > self.limit {
            debug!(
                "Rate limit exceeded for {}: {} > {}",
                identity, count, self.limit
            );
            return Ok(Admission::Limited {
                retry_after: resets_in,
            });
        }

        Ok(Admission::Allowed {
            remaining: self.limit.saturating_sub(count),
        })
    }
}
