//! DTOs for the link authoring endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/url/create`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, message = "originalUrl is required"))]
    pub original_url: String,

    /// Optional custom alias; format is enforced by the authoring service.
    pub custom_alias: Option<String>,

    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Payload of `GET /api/url/metrics/collisions`.
#[derive(Debug, Serialize)]
pub struct CollisionMetrics {
    #[serde(rename = "totalCollisions")]
    pub total_collisions: u64,
}
