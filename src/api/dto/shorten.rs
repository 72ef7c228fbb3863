//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The candidate URL. Only presence is checked here; the safety pipeline
    /// in the service owns every substantive rule so rejections always name
    /// the rule that fired.
    #[validate(length(min = 1, message = "original_url must not be empty"))]
    pub original_url: String,
}

/// Response for a successfully shortened URL.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
}
