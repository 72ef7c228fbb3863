//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and counter-store setup, and the Axum
//! server lifecycle.

use crate::application::services::{LinkService, RateLimiter};
use crate::config::Config;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::PgLinkRepository;
use crate::infrastructure::ratelimit::{CounterStore, MemoryCounterStore, RedisCounterStore};
use crate::routes::app_router;
use crate::security::UrlValidator;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (and applies migrations)
/// - Redis cache (or NullCache fallback)
/// - Rate-limit counter store (Redis-shared or in-process)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Configuration is unusable (bad `BASE_URL`, bad listen address)
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    // A Redis outage downgrades limits to per-instance instead of refusing
    // to start; the memory store still enforces the window locally.
    let counter_store: Arc<dyn CounterStore> = if let Some(redis_url) = &config.redis_url {
        match RedisCounterStore::connect(redis_url).await {
            Ok(store) => {
                tracing::info!("Rate-limit counters shared via Redis");
                Arc::new(store)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis for rate limiting: {}. Using in-process counters.",
                    e
                );
                Arc::new(MemoryCounterStore::new())
            }
        }
    } else {
        tracing::info!("Rate-limit counters kept in-process");
        Arc::new(MemoryCounterStore::new())
    };

    let repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(
        Arc::new(pool),
        config.secret.clone(),
    ));

    let validator = UrlValidator::new(
        config.own_domain()?,
        Duration::from_millis(config.dns_timeout_ms),
    );

    let link_service = Arc::new(LinkService::new(
        repository.clone(),
        cache.clone(),
        validator,
        config.base_url.clone(),
        config.link_ttl_days,
        Duration::from_secs(config.storage_timeout_seconds),
    ));

    let rate_limiter = Arc::new(RateLimiter::new(
        counter_store,
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_seconds),
    ));

    let state = AppState::new(link_service, rate_limiter, repository, cache);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
