//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;

/// PostgreSQL repository for link storage and retrieval.
///
/// Uses SQLx prepared statements for SQL injection protection. Short codes
/// are assigned inside the create transaction: the row is inserted to obtain
/// its id, the code is derived from that id with the service secret, and the
/// code lands on the row before commit. A failed step rolls the whole
/// transaction back, so no code-less row ever becomes visible.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
    secret: String,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool and the
    /// secret used to derive short codes.
    pub fn new(pool: Arc<PgPool>, secret: String) -> Self {
        Self { pool, secret }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO links (original_url, expires_at) VALUES ($1, $2) RETURNING id",
        )
        .bind(&new_link.original_url)
        .bind(new_link.expires_at)
        .fetch_one(&mut *tx)
        .await?;

        let code = generate_code(&self.secret, id);

        let link = sqlx::query_as::<_, Link>(
            r#"
            UPDATE links
            SET short_code = $1
            WHERE id = $2
            RETURNING id, original_url, short_code, created_at, expires_at, last_accessed_at
            "#,
        )
        .bind(&code)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(link)
    }

    async fn find_reusable_by_url(&self, original_url: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, original_url, short_code, created_at, expires_at, last_accessed_at
            FROM links
            WHERE original_url = $1
              AND short_code IS NOT NULL
              AND (expires_at IS NULL OR expires_at > now())
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, original_url, short_code, created_at, expires_at, last_accessed_at
            FROM links
            WHERE short_code = $1
              AND (expires_at IS NULL OR expires_at > now())
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn record_access(&self, code: &str) -> Result<Option<i64>, AppError> {
        let link_id: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE links
            SET last_accessed_at = now()
            WHERE short_code = $1
              AND (expires_at IS NULL OR expires_at > now())
            RETURNING id
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        let Some(link_id) = link_id else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO link_clicks (link_id, clicks)
            VALUES ($1, 1)
            ON CONFLICT (link_id) DO UPDATE SET clicks = link_clicks.clicks + 1
            "#,
        )
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(Some(link_id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
