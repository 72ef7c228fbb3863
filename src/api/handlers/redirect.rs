//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code through the cache-aside service (cache hit serves
///    without a durable URL lookup).
/// 2. Record the access against durable storage on both paths.
/// 3. Return `307 Temporary Redirect` with the original URL in `Location`.
///
/// The redirect is temporary so clients re-resolve on every visit and
/// expiry takes effect immediately instead of living on in browser caches.
///
/// # Errors
///
/// Returns 404 Not Found for unknown and expired codes alike.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let url = state.link_service.resolve(&code).await?;

    Ok(Redirect::temporary(&url))
}
