//! Click ingestion: out-of-band enrichment and dual persistence.
//!
//! Runs after the response has been sent, on a task with its own deadline,
//! so a slow geo lookup or a disconnecting client never delays or cancels
//! analytics. Everything here is best-effort: failures are logged and
//! counted, never surfaced to the request path.

use crate::domain::entities::{ClickEvent, ClickGeo, ClickRequestMeta};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::infrastructure::broker::EventPublisher;
use crate::utils::ip::hash_ip_address;
use crate::utils::ua_parser::{extract_domain, parse_user_agent};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use super::geoip_service::GeoIpService;
use super::redirect_service::RedirectService;

pub struct ClickService {
    clicks: Arc<dyn ClickRepository>,
    redirect: Arc<RedirectService>,
    geoip: Arc<GeoIpService>,
    publisher: Arc<dyn EventPublisher>,
    click_queue: String,
}

impl ClickService {
    pub fn new(
        clicks: Arc<dyn ClickRepository>,
        redirect: Arc<RedirectService>,
        geoip: Arc<GeoIpService>,
        publisher: Arc<dyn EventPublisher>,
        click_queue: String,
    ) -> Self {
        Self {
            clicks,
            redirect,
            geoip,
            publisher,
            click_queue,
        }
    }

    /// Records one resolution of `short_code`.
    ///
    /// The click counter increment is fired off independently; enrichment
    /// (UA parse, referrer domain, geo) happens inline, bounded by the
    /// caller's deadline. Geo failures degrade to an event without the geo
    /// group.
    pub async fn track_click(&self, meta: ClickRequestMeta, short_code: String) {
        let clicked_at = Utc::now();

        {
            let redirect = self.redirect.clone();
            let code = short_code.clone();
            tokio::spawn(async move {
                if let Err(e) = redirect.increment_click_count(&code).await {
                    warn!(error = %e, short_code = %code, "failed to increment click count");
                }
            });
        }

        let ip_hash = hash_ip_address(&meta.client_ip);
        let ua = parse_user_agent(&meta.user_agent);
        let referrer_domain = extract_domain(&meta.referrer);

        let geo = match self.geoip.get_location(&meta.client_ip).await {
            Ok(location) => Some(ClickGeo {
                country_code: location.country_code,
                city: location.city,
                region: location.region_name,
                lat: location.lat,
                lon: location.lon,
            }),
            Err(e) => {
                warn!(error = %e, "geolocation unavailable, recording click without geo");
                None
            }
        };

        let event = ClickEvent {
            clicked_at,
            short_code,
            ip_address_hash: ip_hash,
            user_agent: meta.user_agent,
            referrer_url: meta.referrer,
            referrer_domain,
            device_type: ua.device_type,
            browser_name: ua.browser_name,
            browser_version: ua.browser_version,
            os_name: ua.os_name,
            os_version: ua.os_version,
            is_bot: ua.is_bot,
            geo,
        };

        match self.clicks.insert(&event).await {
            Ok(()) => {
                metrics::counter!("click_events_recorded_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("click_events_failed_total").increment(1);
                warn!(error = %e, short_code = %event.short_code, "failed to persist click event");
            }
        }

        if let Err(e) = self.publish_analytics_event(&event).await {
            warn!(error = %e, short_code = %event.short_code, "failed to publish click event");
        }
    }

    /// Publishes the enriched click document to the analytics queue.
    async fn publish_analytics_event(&self, event: &ClickEvent) -> Result<(), AppError> {
        let payload = json!({
            "index_type": "click_events",
            "data": {
                "short_code": event.short_code,
                "metadata": {
                    "clicked_at": event.clicked_at,
                    "is_bot": event.is_bot,
                    "client": {
                        "ip_hash": event.ip_address_hash,
                        "geo": event.geo.as_ref().map(|g| json!({
                            "country_iso_code": g.country_code,
                            "region_name": g.region,
                            "city": g.city,
                            "location": { "lat": g.lat, "lon": g.lon },
                        })),
                    },
                    "http": {
                        "referrer": event.referrer_url,
                        "referrer_domain": event.referrer_domain,
                    },
                    "user_agent": {
                        "original": event.user_agent,
                        "device": { "name": event.device_type.as_str() },
                        "browser": {
                            "name": event.browser_name,
                            "version": event.browser_version,
                        },
                        "os": {
                            "name": event.os_name,
                            "version": event.os_version,
                        },
                    },
                },
            },
        });

        let bytes = serde_json::to_vec(&payload)
            .map_err(|e| AppError::internal("failed to encode click payload").wrap(e))?;

        self.publisher.publish(&self.click_queue, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use crate::infrastructure::broker::MockEventPublisher;
    use crate::infrastructure::cache::{Cache, CacheKeys, MemoryCache};
    use crate::utils::ua_parser::DeviceType;
    use std::sync::Mutex;
    use std::time::Duration;

    const CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    fn service(
        clicks: MockClickRepository,
        links: MockLinkRepository,
        publisher: MockEventPublisher,
    ) -> ClickService {
        let cache = Cache::new(Arc::new(MemoryCache::new()));
        let keys = CacheKeys::new("repath");

        let redirect = Arc::new(RedirectService::new(
            Arc::new(links),
            cache.clone(),
            keys.clone(),
            Duration::from_secs(300),
            Duration::from_secs(30),
        ));

        let geoip = Arc::new(
            GeoIpService::new(cache, keys, Duration::from_secs(300), Duration::from_secs(1))
                .with_api_base("http://127.0.0.1:9/json"),
        );

        ClickService::new(
            Arc::new(clicks),
            redirect,
            geoip,
            Arc::new(publisher),
            "click_events".to_string(),
        )
    }

    fn meta(ip: &str) -> ClickRequestMeta {
        ClickRequestMeta {
            client_ip: ip.to_string(),
            user_agent: CHROME.to_string(),
            referrer: "https://news.example.com/story/1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_track_click_builds_enriched_event() {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let sink = recorded.clone();

        let mut clicks = MockClickRepository::new();
        clicks.expect_insert().times(1).returning(move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });

        let mut links = MockLinkRepository::new();
        links
            .expect_increment_click_count()
            .returning(|_| Ok(()));

        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(|queue, payload| {
                let value: serde_json::Value = serde_json::from_slice(payload).unwrap();
                queue == "click_events"
                    && value["index_type"] == "click_events"
                    && value["data"]["short_code"] == "abc123"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(clicks, links, publisher);
        // Private IP: geo resolves to the local sentinel without I/O.
        svc.track_click(meta("192.168.1.1"), "abc123".to_string())
            .await;

        let events = recorded.lock().unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];

        assert_eq!(event.short_code, "abc123");
        assert_eq!(event.ip_address_hash.len(), 64);
        assert!(event.ip_address_hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(event.device_type, DeviceType::Desktop);
        assert_eq!(event.browser_name, "Chrome");
        assert_eq!(event.referrer_domain, "news.example.com");
        assert!(!event.is_bot);

        let geo = event.geo.as_ref().expect("sentinel geo expected");
        assert_eq!(geo.country_code, "XX");
        assert_eq!(geo.city, "Localhost");
    }

    #[tokio::test]
    async fn test_geo_failure_degrades_to_no_geo_group() {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let sink = recorded.clone();

        let mut clicks = MockClickRepository::new();
        clicks.expect_insert().times(1).returning(move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });

        let mut links = MockLinkRepository::new();
        links
            .expect_increment_click_count()
            .returning(|_| Ok(()));

        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().times(1).returning(|_, _| Ok(()));

        let svc = service(clicks, links, publisher);
        // Public IP against an unreachable geo endpoint.
        svc.track_click(meta("8.8.8.8"), "abc123".to_string()).await;

        let events = recorded.lock().unwrap();
        assert!(events[0].geo.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_absorbed() {
        let mut clicks = MockClickRepository::new();
        clicks
            .expect_insert()
            .times(1)
            .returning(|_| Err(AppError::database("insert failed")));

        let mut links = MockLinkRepository::new();
        links
            .expect_increment_click_count()
            .returning(|_| Ok(()));

        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().times(1).returning(|_, _| Ok(()));

        let svc = service(clicks, links, publisher);
        // Must not panic or propagate.
        svc.track_click(meta("10.0.0.1"), "abc123".to_string()).await;
    }
}
