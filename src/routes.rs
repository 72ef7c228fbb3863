//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /`            - Submit a URL for shortening (rate limited)
//! - `GET  /{code}`      - Short link redirect
//! - `GET  /health`      - Health check: database and cache
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Fixed window per caller identity, submit route only
//! - **Security headers** - Stamped on every response
//! - **Body limit** - JSON bodies capped at 1 MiB
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, redirect_handler, shorten_handler};
use crate::api::middleware::{rate_limit, security_headers, tracing};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Upper bound on request body size.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Constructs the application router with all routes and middleware.
///
/// Rate limiting applies to the submit route only; redirects and health
/// checks are not counted against the caller's window.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let submit_routes = Router::new()
        .route("/", post(shorten_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    let router = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .merge(submit_routes)
        .layer(middleware::from_fn(security_headers::layer))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
