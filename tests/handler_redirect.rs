mod common;

use axum_test::TestServer;
use repath::routes::app_router;
use std::time::Duration;

fn server(harness: &common::TestHarness) -> TestServer {
    TestServer::new(app_router(harness.state.clone())).unwrap()
}

#[tokio::test]
async fn test_cold_cache_read_populates_cache_and_flag() {
    let harness = common::build_harness(common::FakeRpcClient::silent());
    common::seed_link(
        &harness.links,
        "abc123",
        "https://example.com/",
        7,
        true,
        None,
    );

    let response = server(&harness)
        .get("/r/abc123")
        .add_header("x-forwarded-for", "192.168.1.50")
        .add_header("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    // Trailing slash is stripped by normalization.
    assert_eq!(body["data"]["originalUrl"], "https://example.com");

    // Projection cached under the url family key.
    assert!(harness
        .cache_backend
        .ttl_remaining("repath:url:abc123")
        .is_some());

    // Owner's dashboard invalidation flag set with a short TTL.
    let flag_ttl = harness
        .cache_backend
        .ttl_remaining("repath:dashboard_invalid:7")
        .expect("invalidation flag must exist");
    assert!(flag_ttl <= Duration::from_secs(30));
}

#[tokio::test]
async fn test_redirect_records_click_out_of_band() {
    let harness = common::build_harness(common::FakeRpcClient::silent());
    common::seed_link(
        &harness.links,
        "abc123",
        "https://example.com/page",
        7,
        true,
        None,
    );

    let response = server(&harness)
        .get("/r/abc123")
        .add_header("x-forwarded-for", "10.1.2.3")
        .add_header("user-agent", "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1")
        .add_header("referer", "https://news.example.com/story/1")
        .await;

    response.assert_status_ok();

    // Click ingestion runs on a spawned task after the response.
    let clicks = harness.clicks.clone();
    common::wait_for(|| !clicks.events().is_empty()).await;

    let events = harness.clicks.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];

    assert_eq!(event.short_code, "abc123");
    assert_eq!(event.ip_address_hash.len(), 64);
    assert!(event
        .ip_address_hash
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(event.device_type.as_str(), "mobile");
    assert_eq!(event.referrer_domain, "news.example.com");

    // Private client IP resolves to the local sentinel.
    let geo = event.geo.as_ref().unwrap();
    assert_eq!(geo.country_code, "XX");

    // Counter increment reached the store.
    let links = harness.links.clone();
    common::wait_for(|| links.click_count("abc123") == 1).await;

    // Enriched payload published to the analytics queue.
    let publisher = harness.publisher.clone();
    common::wait_for(|| !publisher.published().is_empty()).await;
    let (queue, payload) = &harness.publisher.published()[0];
    assert_eq!(queue, "click_events");
    let doc: serde_json::Value = serde_json::from_slice(payload).unwrap();
    assert_eq!(doc["index_type"], "click_events");
    assert_eq!(doc["data"]["short_code"], "abc123");
}

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let harness = common::build_harness(common::FakeRpcClient::silent());
    common::seed_link(
        &harness.links,
        "abc123",
        "https://example.com/page",
        7,
        true,
        None,
    );

    let server = server(&harness);
    server
        .get("/r/abc123")
        .add_header("x-forwarded-for", "10.0.0.2")
        .await
        .assert_status_ok();

    // Remove the link from the store; the cached projection must answer.
    harness.links.seed({
        let mut dead = harness.links.get("abc123").unwrap();
        dead.is_deleted = true;
        dead
    });

    let response = server
        .get("/r/abc123")
        .add_header("x-forwarded-for", "10.0.0.2")
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_expired_link_is_410_and_not_cached() {
    let harness = common::build_harness(common::FakeRpcClient::silent());
    common::seed_link(
        &harness.links,
        "old001",
        "https://example.com/old",
        7,
        true,
        Some(chrono::Utc::now() - chrono::Duration::seconds(1)),
    );

    let response = server(&harness).get("/r/old001").await;
    response.assert_status(axum::http::StatusCode::GONE);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "URL_EXPIRED");

    assert!(harness
        .cache_backend
        .ttl_remaining("repath:url:old001")
        .is_none());
}

#[tokio::test]
async fn test_inactive_link_is_403() {
    let harness = common::build_harness(common::FakeRpcClient::silent());
    common::seed_link(
        &harness.links,
        "off001",
        "https://example.com/off",
        7,
        false,
        Some(chrono::Utc::now() + chrono::Duration::hours(1)),
    );

    let response = server(&harness).get("/r/off001").await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "URL_INACTIVE");
}

#[tokio::test]
async fn test_unknown_code_is_404() {
    let harness = common::build_harness(common::FakeRpcClient::silent());

    let response = server(&harness).get("/r/nosuch").await;
    response.assert_status_not_found();

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "URL_NOT_FOUND");
}

#[tokio::test]
async fn test_overlong_short_url_is_400() {
    let harness = common::build_harness(common::FakeRpcClient::silent());

    let long_code = "a".repeat(51);
    let response = server(&harness).get(&format!("/r/{long_code}")).await;
    response.assert_status_bad_request();

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_info_endpoint_does_not_track_clicks() {
    let harness = common::build_harness(common::FakeRpcClient::silent());
    common::seed_link(
        &harness.links,
        "abc123",
        "https://example.com/page",
        7,
        true,
        None,
    );

    let response = server(&harness).get("/api/info/abc123").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["originalUrl"], "https://example.com/page");

    // Give any stray ingestion task a moment, then confirm silence.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.clicks.events().is_empty());
    assert_eq!(harness.links.click_count("abc123"), 0);
}
