//! DTOs for redirect resolution endpoints.

use crate::domain::entities::LinkProjection;
use crate::utils::url_normalizer::normalize_url;
use serde::Serialize;

/// Payload of `/r/{shortUrl}` and `/api/info/{shortUrl}`.
#[derive(Debug, Serialize)]
pub struct RedirectData {
    #[serde(rename = "originalUrl")]
    pub original_url: String,
}

impl From<LinkProjection> for RedirectData {
    fn from(projection: LinkProjection) -> Self {
        // Stored URLs predating the current normalization rules are
        // re-normalized on the way out; normalization is idempotent so
        // this is a no-op for anything written by the authoring path.
        let original_url = normalize_url(&projection.original_url)
            .unwrap_or(projection.original_url);
        Self { original_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_normalized() {
        let data = RedirectData::from(LinkProjection {
            original_url: "https://example.com/".to_string(),
            is_active: true,
            owner_id: 1,
            expires_at: None,
        });
        assert_eq!(data.original_url, "https://example.com");
    }
}
