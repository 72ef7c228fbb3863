//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for storing and resolving short links.
///
/// Implementations assign the short code during creation: the link row is
/// inserted first, the code is derived from the fresh row id, and both steps
/// commit together so no row is ever visible without its code.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL, used in production
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-memory, used by tests
///   and database-less development runs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link and assigns its short code atomically.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the insert, the code assignment, or
    /// the commit fails. No partial row survives a failure.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds the newest non-expired link for an original URL, if any.
    ///
    /// Used for deduplication before creating a new row. Best-effort: a
    /// concurrent create for the same URL may still slip past this check,
    /// which is tolerated (both rows resolve correctly).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_reusable_by_url(&self, original_url: &str) -> Result<Option<Link>, AppError>;

    /// Finds a non-expired link by its short code.
    ///
    /// Expired links are treated exactly like missing ones: both return
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Records an access: stamps `last_accessed_at` and increments the click
    /// counter for the link.
    ///
    /// Returns the link id, or `None` when no row matches the code any more
    /// (for example a stale cache entry pointing at a deleted row).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_access(&self, code: &str) -> Result<Option<i64>, AppError>;

    /// Verifies the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store cannot be reached.
    async fn ping(&self) -> Result<(), AppError>;
}
