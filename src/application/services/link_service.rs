//! Link creation and resolution service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, warn};
use url::Url;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::security::UrlValidator;

/// Service for creating and resolving shortened links.
///
/// Every submitted URL passes the full safety pipeline before any storage
/// call, and identical still-valid URLs are deduplicated to the existing
/// code. Resolution is cache-aside: a hit serves from the cache, a miss
/// queries durable storage and backfills the cache. Both paths record the
/// access against durable storage.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    validator: UrlValidator,
    base_url: String,
    link_ttl_days: u32,
    storage_timeout: Duration,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// # Arguments
    ///
    /// - `base_url` - public base for short URLs (e.g., `"https://s.example.com"`)
    /// - `link_ttl_days` - lifetime of new links; `0` means links never expire
    /// - `storage_timeout` - upper bound for each repository and cache call
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        validator: UrlValidator,
        base_url: String,
        link_ttl_days: u32,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            validator,
            base_url,
            link_ttl_days,
            storage_timeout,
        }
    }

    /// Creates a short link for a submitted URL.
    ///
    /// # Validation
    ///
    /// The raw URL runs through the full safety pipeline first. Nothing is
    /// stored for a rejected URL, and the rejection names the rule that
    /// fired.
    ///
    /// # Deduplication
    ///
    /// If a non-expired link for the same canonical URL already exists, the
    /// existing link is returned instead of creating a duplicate. Best-effort:
    /// two concurrent submissions of the same URL may still produce two rows,
    /// and both stay resolvable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL fails the safety pipeline.
    /// Returns [`AppError::Internal`] if storage fails or times out.
    pub async fn shorten(&self, raw_url: &str) -> Result<Link, AppError> {
        let canonical = self.validator.validate(raw_url).await?;

        if let Some(existing) = self
            .with_storage_timeout(self.repository.find_reusable_by_url(&canonical))
            .await?
        {
            debug!("Reusing link {} for {}", existing.short_code, canonical);
            return Ok(existing);
        }

        let expires_at = (self.link_ttl_days > 0)
            .then(|| Utc::now() + chrono::Duration::days(i64::from(self.link_ttl_days)));

        let new_link = NewLink {
            original_url: canonical,
            expires_at,
        };

        self.with_storage_timeout(self.repository.create(new_link))
            .await
    }

    /// Resolves a short code to its redirect target.
    ///
    /// # Request Flow
    ///
    /// 1. Check the cache. A hit skips the durable lookup for the URL itself.
    /// 2. On a miss, query durable storage; missing and expired codes are one
    ///    and the same "not found" outcome.
    /// 3. Re-check that the stored URL is still an absolute `http`/`https`
    ///    URL. Rows that predate a policy tightening or were written around
    ///    the validator must not turn into redirects.
    /// 4. Record the access (stamp `last_accessed_at`, bump the click
    ///    counter) on both paths.
    /// 5. On the durable-storage path, backfill the cache so the next
    ///    resolutions within the TTL window are hits.
    ///
    /// A cache hit whose backing row has vanished resolves to not-found: the
    /// cache may be up to its TTL stale, and a deleted or expired link must
    /// not keep redirecting from the cache alone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active link matches the code.
    /// Returns [`AppError::Validation`] if the stored URL fails the re-check.
    /// Returns [`AppError::Internal`] if storage fails or times out.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        if let Some(cached_url) = self.cached_url(code).await {
            return match self
                .with_storage_timeout(self.repository.record_access(code))
                .await?
            {
                Some(_) => Ok(cached_url),
                None => Err(AppError::not_found(
                    "Short link not found",
                    json!({ "code": code }),
                )),
            };
        }

        let link = self
            .with_storage_timeout(self.repository.find_active_by_code(code))
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        if !is_redirect_target(&link.original_url) {
            warn!("Stored URL for {} is not a redirect target", code);
            return Err(AppError::bad_request(
                "Invalid redirect target",
                json!({ "code": code }),
            ));
        }

        if self
            .with_storage_timeout(self.repository.record_access(code))
            .await?
            .is_none()
        {
            // The row answered the lookup a moment ago; losing the race to a
            // concurrent delete is not worth failing the redirect over.
            debug!("Link {} disappeared before access was recorded", code);
        }

        match tokio::time::timeout(
            self.storage_timeout,
            self.cache
                .set_url(&link.short_code, &link.original_url, None),
        )
        .await
        {
            Ok(Err(e)) => warn!("Failed to cache URL for {}: {}", code, e),
            Err(_) => warn!("Cache write for {} timed out", code),
            Ok(Ok(())) => {}
        }

        Ok(link.original_url)
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// Reads the cache for a code, treating errors and timeouts as misses.
    async fn cached_url(&self, code: &str) -> Option<String> {
        match tokio::time::timeout(self.storage_timeout, self.cache.get_url(code)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                error!("Cache error for {}: {}", code, e);
                None
            }
            Err(_) => {
                warn!("Cache read for {} timed out", code);
                None
            }
        }
    }

    /// Bounds a repository call with the configured storage timeout.
    async fn with_storage_timeout<T>(
        &self,
        operation: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.storage_timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Storage operation timed out after {:?}",
                    self.storage_timeout
                );
                Err(AppError::internal("Storage failure", json!({})))
            }
        }
    }
}

/// Checks a stored URL is still an absolute `http`/`https` redirect target.
fn is_redirect_target(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https") && parsed.has_host()
    })
}
