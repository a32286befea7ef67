mod common;

use axum_test::TestServer;
use repath::infrastructure::cache::Cache;
use repath::routes::app_router;
use std::time::Duration;

fn server(harness: &common::TestHarness) -> TestServer {
    TestServer::new(app_router(harness.state.clone())).unwrap()
}

#[tokio::test]
async fn test_dashboard_requires_bearer_token() {
    let harness = common::build_harness(common::FakeRpcClient::silent());

    let response = server(&harness).get("/api/dashboard").await;
    response.assert_status_unauthorized();

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_dashboard_rejects_expired_token() {
    let harness = common::build_harness(common::FakeRpcClient::silent());

    let response = server(&harness)
        .get("/api/dashboard")
        .add_header(
            "authorization",
            format!("Bearer {}", common::expired_token(42)),
        )
        .await;
    response.assert_status_unauthorized();

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_dashboard_cache_hit_skips_rpc() {
    let harness = common::build_harness(common::FakeRpcClient::silent());

    // Seed the payload cache; no invalidation flag present.
    let cache = Cache::new(harness.cache_backend.clone());
    cache
        .set(
            "repath:dashboard:42",
            &common::sample_dashboard_reply(42, "success"),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    let response = server(&harness)
        .get("/api/dashboard")
        .add_header("authorization", format!("Bearer {}", common::mint_token(42, "user")))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["total_click"], 128);
    assert_eq!(body["data"]["total_link"], 4);
    assert_eq!(body["data"]["uniq_visitors"], 77);
    assert_eq!(body["data"]["limited"], false);

    // RPC never invoked; payload TTL refreshed past its seeded 5 seconds.
    assert_eq!(harness.rpc.call_count(), 0);
    let remaining = harness
        .cache_backend
        .ttl_remaining("repath:dashboard:42")
        .unwrap();
    assert!(remaining > Duration::from_secs(5));
}

#[tokio::test]
async fn test_invalidation_flag_forces_rpc_refresh() {
    let harness =
        common::build_harness(common::FakeRpcClient::replying(common::sample_dashboard_reply(
            42, "success",
        )));

    let cache = Cache::new(harness.cache_backend.clone());
    let mut stale = common::sample_dashboard_reply(42, "success");
    stale.total_clicks = 1;
    cache
        .set("repath:dashboard:42", &stale, Duration::from_secs(300))
        .await
        .unwrap();
    cache
        .set_invalidation_flag("repath:dashboard_invalid:42", Duration::from_secs(30))
        .await
        .unwrap();

    let response = server(&harness)
        .get("/api/dashboard")
        .add_header("authorization", format!("Bearer {}", common::mint_token(42, "user")))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["total_click"], 128);

    assert_eq!(harness.rpc.call_count(), 1);
    // Flag consumed.
    assert!(harness
        .cache_backend
        .ttl_remaining("repath:dashboard_invalid:42")
        .is_none());
}

#[tokio::test]
async fn test_rpc_timeout_is_503_external_service_error() {
    let harness = common::build_harness(common::FakeRpcClient::silent());

    let response = server(&harness)
        .get("/api/dashboard")
        .add_header("authorization", format!("Bearer {}", common::mint_token(42, "user")))
        .await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "EXTERNAL_SERVICE_ERROR");
}

#[tokio::test]
async fn test_limited_reply_carries_advisory_flag() {
    let harness = common::build_harness(common::FakeRpcClient::replying(
        common::sample_dashboard_reply(42, "limited"),
    ));

    let response = server(&harness)
        .get("/api/dashboard")
        .add_header("authorization", format!("Bearer {}", common::mint_token(42, "user")))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["limited"], true);

    // Limited payloads are cached like successful ones.
    assert!(harness
        .cache_backend
        .ttl_remaining("repath:dashboard:42")
        .is_some());
}
