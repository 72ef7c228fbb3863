//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;

/// In-memory repository for tests and database-less development runs.
///
/// Mirrors the PostgreSQL implementation's semantics: codes derive from the
/// row id, expired rows behave exactly like missing ones, and accesses stamp
/// `last_accessed_at` and bump a per-link click counter.
pub struct MemoryLinkRepository {
    links: Mutex<BTreeMap<i64, Link>>,
    clicks: Mutex<HashMap<i64, i64>>,
    next_id: AtomicI64,
    secret: String,
}

impl MemoryLinkRepository {
    pub fn new(secret: String) -> Self {
        Self {
            links: Mutex::new(BTreeMap::new()),
            clicks: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            secret,
        }
    }

    /// Returns the recorded click count for a link id. Test helper.
    pub fn clicks_for(&self, link_id: i64) -> i64 {
        self.clicks
            .lock()
            .map(|clicks| clicks.get(&link_id).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Returns the number of stored rows, expired included. Test helper.
    pub fn count(&self) -> usize {
        self.links.lock().map(|links| links.len()).unwrap_or(0)
    }

    fn poisoned() -> AppError {
        AppError::internal("Storage failure", json!({}))
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let link = Link {
            id,
            original_url: new_link.original_url,
            short_code: generate_code(&self.secret, id),
            created_at: Utc::now(),
            expires_at: new_link.expires_at,
            last_accessed_at: None,
        };

        let mut links = self.links.lock().map_err(|_| Self::poisoned())?;
        links.insert(id, link.clone());

        Ok(link)
    }

    async fn find_reusable_by_url(&self, original_url: &str) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().map_err(|_| Self::poisoned())?;

        // Ids are monotonic, so the last match is the newest row.
        Ok(links
            .values()
            .filter(|link| link.original_url == original_url && !link.is_expired())
            .next_back()
            .cloned())
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().map_err(|_| Self::poisoned())?;

        Ok(links
            .values()
            .find(|link| link.short_code == code && !link.is_expired())
            .cloned())
    }

    async fn record_access(&self, code: &str) -> Result<Option<i64>, AppError> {
        let mut links = self.links.lock().map_err(|_| Self::poisoned())?;

        let Some(link) = links
            .values_mut()
            .find(|link| link.short_code == code && !link.is_expired())
        else {
            return Ok(None);
        };

        link.last_accessed_at = Some(Utc::now());
        let id = link.id;
        drop(links);

        let mut clicks = self.clicks.lock().map_err(|_| Self::poisoned())?;
        *clicks.entry(id).or_insert(0) += 1;

        Ok(Some(id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
