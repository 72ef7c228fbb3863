//! Fixed-window rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::application::services::Admission;
use crate::error::AppError;
use crate::security::identity::derive_identity;
use crate::state::AppState;

/// Admits or rejects a request against the caller's fixed window.
///
/// # Identity
///
/// The caller identity is derived right here and passed down explicitly:
/// first `X-Forwarded-For` entry, else the peer socket IP, else the
/// `device_id` cookie. See [`derive_identity`] for the precedence rules.
///
/// # Rejection
///
/// Requests past the limit receive `429 Too Many Requests` with a
/// `Retry-After` header carrying the remaining window time, rounded up to
/// whole seconds.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::post, middleware};
///
/// let app = Router::new()
///     .route("/", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let forwarded_for = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok());
    let device_id = cookie_value(req.headers(), "device_id");

    let identity = derive_identity(forwarded_for, Some(addr.ip()), device_id.as_deref());

    match state.rate_limiter.admit(&identity).await? {
        Admission::Allowed { .. } => Ok(next.run(req).await),
        Admission::Limited { retry_after } => {
            let secs = retry_after.as_millis().div_ceil(1000).max(1) as u64;
            Err(AppError::rate_limited(secs))
        }
    }
}

/// Extracts a named cookie's value from the `Cookie` header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}
