//! Handlers for the authoring endpoints.

use axum::{extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

use crate::api::dto::link::{CollisionMetrics, CreateLinkRequest};
use crate::api::dto::ApiResponse;
use crate::application::services::CreateLinkInput;
use crate::domain::entities::{Link, UserClaims};
use crate::error::AppError;
use crate::state::AppState;

/// `POST /api/url/create`
///
/// Accessible to the `user` and `admin` roles.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(body): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Link>>), AppError> {
    if !matches!(claims.role.as_str(), "user" | "admin") {
        return Err(AppError::forbidden().with_context("role", claims.role.clone()));
    }

    body.validate().map_err(|e| {
        AppError::invalid_input("Request validation failed").with_context("errors", e.to_string())
    })?;

    let link = state
        .authoring_service
        .create(
            CreateLinkInput {
                original_url: body.original_url,
                custom_alias: body.custom_alias,
                title: body.title,
                description: body.description,
            },
            claims.user_id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Short link created", link)),
    ))
}

/// `GET /api/url/metrics/collisions`
///
/// Admin-only observability for short-code keyspace pressure.
pub async fn collision_metrics_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<CollisionMetrics>> {
    Json(ApiResponse::success(
        "Collision metrics retrieved",
        CollisionMetrics {
            total_collisions: state.allocator.collision_count(),
        },
    ))
}
