//! Click event: an append-only record describing one resolution of a
//! short code.

use crate::utils::ua_parser::DeviceType;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Geographic fields of a click. Either the whole group is present or it
/// is absent entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickGeo {
    pub country_code: String,
    pub city: String,
    pub region: String,
    pub lat: f64,
    pub lon: f64,
}

/// An enriched click event, ready for persistence.
#[derive(Debug, Clone, Serialize)]
pub struct ClickEvent {
    pub clicked_at: DateTime<Utc>,
    pub short_code: String,
    /// 64 lower-case hex characters; the raw IP is never stored.
    pub ip_address_hash: String,
    pub user_agent: String,
    pub referrer_url: String,
    pub referrer_domain: String,
    pub device_type: DeviceType,
    pub browser_name: String,
    pub browser_version: String,
    pub os_name: String,
    pub os_version: String,
    pub is_bot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<ClickGeo>,
}

/// Request metadata captured at the boundary before the response is sent.
///
/// The ingestor runs after the response, so this is an owned snapshot of
/// everything it needs from the request.
#[derive(Debug, Clone, Default)]
pub struct ClickRequestMeta {
    pub client_ip: String,
    pub user_agent: String,
    pub referrer: String,
}
