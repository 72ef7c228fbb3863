//! Fixed-window request counters backing the rate limiter.
//!
//! Provides a [`CounterStore`] trait with two implementations:
//! - [`RedisCounterStore`] - Production Redis-backed counters, shared across instances
//! - [`MemoryCounterStore`] - In-process counters for single-instance and test setups

mod memory_store;
mod redis_store;
mod store;

pub use memory_store::MemoryCounterStore;
pub use redis_store::RedisCounterStore;
pub use store::{CounterStore, RateStoreError, WindowCount};

#[cfg(test)]
pub use store::MockCounterStore;
