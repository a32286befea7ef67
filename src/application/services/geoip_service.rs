//! Geo-IP resolution with per-IP caching.

use crate::domain::entities::GeoLocation;
use crate::error::AppError;
use crate::infrastructure::cache::{Cache, CacheKeys};
use crate::utils::ip::is_private_or_local;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const GEO_API_BASE: &str = "http://ip-api.com/json";
const GEO_FIELDS: &str =
    "status,message,country,countryCode,region,regionName,city,zip,lat,lon,timezone,isp,org,as,query";

#[derive(Deserialize)]
struct GeoApiReply {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    location: GeoLocation,
}

/// Resolves client IPs to locations via an external HTTP API.
///
/// Private and loopback addresses short-circuit to a sentinel without any
/// I/O. Successful lookups are cached per IP; cache hits get their TTL
/// refreshed.
pub struct GeoIpService {
    client: reqwest::Client,
    cache: Cache,
    keys: CacheKeys,
    cache_ttl: Duration,
    api_base: String,
}

impl GeoIpService {
    pub fn new(cache: Cache, keys: CacheKeys, cache_ttl: Duration, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            cache,
            keys,
            cache_ttl,
            api_base: GEO_API_BASE.to_string(),
        }
    }

    /// Points lookups at a different endpoint. Used by tests.
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Resolves `ip` to a [`GeoLocation`].
    ///
    /// # Errors
    ///
    /// `EXTERNAL_SERVICE_ERROR` when the geo API is unreachable, answers
    /// non-200, or reports a failed lookup.
    pub async fn get_location(&self, ip: &str) -> Result<GeoLocation, AppError> {
        if is_private_or_local(ip) {
            debug!(ip, "private or loopback address, returning local sentinel");
            return Ok(GeoLocation::local());
        }

        let key = self.keys.geoip(ip);
        match self.cache.get::<GeoLocation>(&key).await {
            Ok(Some(location)) => {
                if let Err(e) = self.cache.refresh_ttl(&key, self.cache_ttl).await {
                    warn!(error = %e, %key, "failed to refresh geoip cache ttl");
                }
                return Ok(location);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, %key, "geoip cache read failed"),
        }

        let url = format!("{}/{}?fields={}", self.api_base, ip, GEO_FIELDS);
        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::external_service("geolocation request failed")
                .with_context("ip", ip)
                .wrap(e)
        })?;

        if !response.status().is_success() {
            return Err(AppError::external_service("geolocation API returned non-success status")
                .with_context("ip", ip)
                .with_context("status", response.status().as_u16()));
        }

        let reply: GeoApiReply = response.json().await.map_err(|e| {
            AppError::external_service("failed to parse geolocation response")
                .with_context("ip", ip)
                .wrap(e)
        })?;

        if reply.status != "success" {
            return Err(AppError::external_service("geolocation lookup failed")
                .with_context("ip", ip)
                .with_context("message", reply.message.unwrap_or_default()));
        }

        if let Err(e) = self.cache.set(&key, &reply.location, self.cache_ttl).await {
            warn!(error = %e, %key, "failed to cache geolocation");
        }

        Ok(reply.location)
    }
}
