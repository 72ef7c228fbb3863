//! Redis-backed counter store shared across service instances.

use super::store::{CounterStore, RateStoreError, WindowCount};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::info;

/// Fixed-window counters kept in Redis.
///
/// Every admission runs `SET key 0 NX EX window`, `INCR key`, `PTTL key` as
/// one atomic block, so all instances sharing the Redis see one counter per
/// identity. Keys live under the `rl:` namespace, separate from the `url:`
/// redirect cache entries on the same instance.
pub struct RedisCounterStore {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisCounterStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`RateStoreError::Connection`] if the URL is invalid or the
    /// connection cannot be established.
    pub async fn connect(redis_url: &str) -> Result<Self, RateStoreError> {
        let client = Client::open(redis_url).map_err(|e| {
            RateStoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            RateStoreError::Connection(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| RateStoreError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis (rate-limit counters)");

        Ok(Self {
            client: manager,
            key_prefix: "rl:".to_string(),
        })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr_in_window(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<WindowCount, RateStoreError> {
        let full_key = format!("{}{}", self.key_prefix, key);
        let mut conn = self.client.clone();

        let secs = window.as_secs().max(1);

        // INCR can recreate a key that expired mid-transaction, leaving a
        // counter with no TTL that would never reset. EXPIRE NX repairs
        // exactly that case and is a no-op otherwise.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(&full_key)
            .arg(0)
            .arg("NX")
            .arg("EX")
            .arg(secs)
            .ignore()
            .cmd("INCR")
            .arg(&full_key)
            .cmd("EXPIRE")
            .arg(&full_key)
            .arg(secs)
            .arg("NX")
            .ignore()
            .cmd("PTTL")
            .arg(&full_key);

        let (count, pttl_ms): (u64, i64) = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| RateStoreError::Operation(format!("Redis INCR failed: {}", e)))?;

        let resets_in = if pttl_ms >= 0 {
            Duration::from_millis(pttl_ms as u64)
        } else {
            window
        };

        Ok(WindowCount { count, resets_in })
    }
}
