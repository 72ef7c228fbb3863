//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored link with its short code and lifecycle metadata.
///
/// `short_code` is assigned inside the creation transaction, derived from the
/// row id, so a fully persisted link always carries one. `expires_at` is
/// `None` for links that never expire.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }
}

/// Input data for creating a new link.
///
/// The short code is not part of the input; it is derived from the row id
/// during creation.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}
