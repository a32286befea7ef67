//! Handler for the owner analytics dashboard.

use axum::{extract::State, Extension, Json};

use crate::api::dto::dashboard::DashboardData;
use crate::api::dto::ApiResponse;
use crate::domain::entities::UserClaims;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/dashboard`
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<ApiResponse<DashboardData>>, AppError> {
    let response = state.dashboard_service.get_dashboard(claims.user_id).await?;

    let message = if response.is_limited() {
        "Dashboard retrieved with limited data"
    } else {
        "Dashboard retrieved successfully"
    };

    Ok(Json(ApiResponse::success(
        message,
        DashboardData::from(response),
    )))
}
