#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use linkward::application::services::{LinkService, RateLimiter};
use linkward::domain::entities::{Link, NewLink};
use linkward::domain::repositories::LinkRepository;
use linkward::infrastructure::cache::NullCache;
use linkward::infrastructure::persistence::MemoryLinkRepository;
use linkward::infrastructure::ratelimit::MemoryCounterStore;
use linkward::security::UrlValidator;
use linkward::state::AppState;

/// Public base the service hands out in `short_url` fields.
pub const TEST_BASE_URL: &str = "http://s.example.com";

/// Builds application state over in-memory storage with a rate limit high
/// enough that ordinary tests never trip it.
pub fn create_test_state() -> (AppState, Arc<MemoryLinkRepository>) {
    create_test_state_with_limit(1000, Duration::from_secs(60))
}

/// Builds application state over in-memory storage with an explicit
/// rate-limit budget.
///
/// The DNS budget is kept short so validation of unresolvable hosts fails
/// open quickly instead of stalling the test.
pub fn create_test_state_with_limit(
    limit: u64,
    window: Duration,
) -> (AppState, Arc<MemoryLinkRepository>) {
    let repository = Arc::new(MemoryLinkRepository::new("test-signing-secret".to_string()));
    let cache = Arc::new(NullCache);

    let validator = UrlValidator::new("s.example.com", Duration::from_millis(200));
    let link_service = Arc::new(LinkService::new(
        repository.clone(),
        cache.clone(),
        validator,
        TEST_BASE_URL.to_string(),
        30,
        Duration::from_secs(5),
    ));
    let rate_limiter = Arc::new(RateLimiter::new(
        Arc::new(MemoryCounterStore::new()),
        limit,
        window,
    ));

    let state = AppState::new(link_service, rate_limiter, repository.clone(), cache);

    (state, repository)
}

/// Inserts a link directly into storage, bypassing the safety pipeline.
pub async fn create_test_link(repository: &MemoryLinkRepository, url: &str) -> Link {
    repository
        .create(NewLink {
            original_url: url.to_string(),
            expires_at: Some(Utc::now() + chrono::Duration::days(30)),
        })
        .await
        .unwrap()
}

/// Inserts a link whose expiry has already passed.
pub async fn create_expired_link(repository: &MemoryLinkRepository, url: &str) -> Link {
    repository
        .create(NewLink {
            original_url: url.to_string(),
            expires_at: Some(Utc::now() - chrono::Duration::hours(1)),
        })
        .await
        .unwrap()
}
