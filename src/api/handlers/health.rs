//! Handler for the health endpoint.

use axum::{extract::State, Json};

use crate::api::dto::health::HealthData;
use crate::api::dto::ApiResponse;
use crate::state::AppState;

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::success(
        "Service is healthy",
        HealthData {
            status: "UP",
            service: state.config.app_name.clone(),
            version: env!("CARGO_PKG_VERSION"),
        },
    ))
}
