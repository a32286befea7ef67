//! Geo-IP lookup result, mirroring the external geolocation API payload.

use serde::{Deserialize, Serialize};

/// Location data for an IP address.
///
/// Cached per IP; private and loopback addresses map to
/// [`GeoLocation::local`] without a network call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default)]
    pub country: String,
    #[serde(rename = "countryCode", default)]
    pub country_code: String,
    #[serde(default)]
    pub region: String,
    #[serde(rename = "regionName", default)]
    pub region_name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub isp: String,
    #[serde(default)]
    pub org: String,
    #[serde(rename = "as", default)]
    pub as_name: String,
    #[serde(default)]
    pub query: String,
}

impl GeoLocation {
    /// Sentinel for loopback and private-range addresses.
    pub fn local() -> Self {
        Self {
            country: "Local".to_string(),
            country_code: "XX".to_string(),
            city: "Localhost".to_string(),
            ..Default::default()
        }
    }
}
