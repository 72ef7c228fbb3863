//! Security response headers middleware.

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// Stamps security headers on every response.
///
/// # Headers
///
/// - `X-Content-Type-Options: nosniff` - prevents MIME sniffing
/// - `X-Frame-Options: DENY` - prevents clickjacking
/// - `Referrer-Policy: strict-origin-when-cross-origin` - limits referrer leakage
/// - `Content-Security-Policy: default-src 'none'` - the service serves JSON
///   and redirects only, never renderable content
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, middleware};
///
/// let app = Router::new().layer(middleware::from_fn(security_headers::layer));
/// ```
pub async fn layer(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'"),
    );

    response
}
