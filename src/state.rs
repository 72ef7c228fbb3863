//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::{LinkService, RateLimiter};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Application-wide shared state.
///
/// Cloned per request by Axum; every field is an `Arc`, so clones are
/// cheap handle copies. The repository and cache handles exist alongside
/// the services so the health endpoint can probe components directly.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub repository: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    /// Creates application state from its shared components.
    pub fn new(
        link_service: Arc<LinkService>,
        rate_limiter: Arc<RateLimiter>,
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            link_service,
            rate_limiter,
            repository,
            cache,
        }
    }
}
