//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching, and request
//! counting.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`ratelimit`] - Fixed-window counter stores for the rate limiter

pub mod cache;
pub mod persistence;
pub mod ratelimit;
