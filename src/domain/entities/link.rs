//! Link entity: the authoritative record for a shortened URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive metadata derived from the parsed original URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlMetadata {
    pub domain: String,
    pub protocol: String,
    pub path: String,
}

/// A shortened URL record.
///
/// `short_code` is globally unique among non-deleted links; `click_count`
/// is eventually consistent with the stream of recorded click events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_alias: Option<String>,
    pub owner_id: i64,
    pub click_count: i64,
    pub is_active: bool,
    #[serde(skip)]
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub metadata: UrlMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a new link. Timestamps are set by the store.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub owner_id: i64,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: UrlMetadata,
}

/// The subset of [`Link`] served on the redirect hot path.
///
/// Everything else is deliberately excluded from the cache payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkProjection {
    pub original_url: String,
    pub is_active: bool,
    pub owner_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
