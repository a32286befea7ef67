//! Route registration and the middleware pipeline.

use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    collision_metrics_handler, create_link_handler, dashboard_handler, health_handler,
    redirect_handler, url_info_handler,
};
use crate::api::middleware::auth;
use crate::config::Config;
use crate::state::AppState;

/// Publicly accessible routes.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/r/{short_url}", get(redirect_handler))
        .route("/api/info/{short_url}", get(url_info_handler))
}

/// Routes requiring a verified bearer token.
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/url/create", post(create_link_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
}

/// Admin-only routes. Authentication runs before the role guard.
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/url/metrics/collisions", get(collision_metrics_handler))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
}

/// Assembles the full application router.
pub fn app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        .merge(admin_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = if config.cors_allow_origins.trim() == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .cors_allow_origins
                .split(',')
                .filter_map(|o| o.trim().parse::<HeaderValue>().ok()),
        )
    };

    let methods = AllowMethods::list(
        config
            .cors_allow_methods
            .split(',')
            .filter_map(|m| m.trim().parse::<Method>().ok()),
    );

    let headers = AllowHeaders::list(
        config
            .cors_allow_headers
            .split(',')
            .filter_map(|h| h.trim().parse::<HeaderName>().ok()),
    );

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
}
