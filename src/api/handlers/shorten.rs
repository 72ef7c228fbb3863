//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a submitted URL.
///
/// # Endpoint
///
/// `POST /`
///
/// # Request Body
///
/// ```json
/// { "original_url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// `201 Created` with the code and the full short URL:
///
/// ```json
/// { "code": "aZ09-_aa", "short_url": "https://s.example.com/aZ09-_aa" }
/// ```
///
/// Submitting the same still-valid URL again returns the existing code.
///
/// # Errors
///
/// Returns 400 Bad Request if the body is malformed or the URL fails the
/// safety pipeline; the error details name the rule that rejected it.
/// Returns 429 Too Many Requests when the caller's window is exhausted.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.shorten(&payload.original_url).await?;
    let short_url = state.link_service.short_url(&link.short_code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            code: link.short_code,
            short_url,
        }),
    ))
}
