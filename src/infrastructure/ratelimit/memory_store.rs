//! In-process counter store backed by a mutex-guarded map.

use super::store::{CounterStore, RateStoreError, WindowCount};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Map size at which lapsed windows are swept out.
///
/// Without the sweep every identity ever seen would stay in the map; with
/// it the map is bounded by the number of identities active inside one
/// window plus the threshold.
const PURGE_THRESHOLD: usize = 4096;

struct WindowEntry {
    count: u64,
    reset_at: Instant,
}

/// Fixed-window counters held in process memory.
///
/// Suitable for single-instance deployments and tests. Counters are not
/// shared across processes; a multi-instance deployment should use
/// [`crate::infrastructure::ratelimit::RedisCounterStore`] instead.
pub struct MemoryCounterStore {
    windows: Mutex<HashMap<String, WindowEntry>>,
}

impl MemoryCounterStore {
    /// Creates an empty counter store.
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr_in_window(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<WindowCount, RateStoreError> {
        let now = Instant::now();

        let mut windows = self
            .windows
            .lock()
            .map_err(|e| RateStoreError::Operation(format!("Counter map poisoned: {}", e)))?;

        if windows.len() >= PURGE_THRESHOLD && !windows.contains_key(key) {
            windows.retain(|_, entry| entry.reset_at > now);
        }

        let entry = windows
            .entry(key.to_string())
            .or_insert_with(|| WindowEntry {
                count: 0,
                reset_at: now + window,
            });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + window;
        }

        entry.count += 1;

        Ok(WindowCount {
            count: entry.count,
            resets_in: entry.reset_at.saturating_duration_since(now),
        })
    }
}
