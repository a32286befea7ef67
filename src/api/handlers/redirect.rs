//! Handlers for short URL resolution.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use tracing::warn;

use crate::api::dto::redirect::RedirectData;
use crate::api::dto::ApiResponse;
use crate::domain::entities::ClickRequestMeta;
use crate::error::AppError;
use crate::state::AppState;

const MAX_SHORT_URL_LEN: usize = 50;

fn validate_short_url(short_url: &str) -> Result<(), AppError> {
    if short_url.is_empty() {
        return Err(AppError::invalid_input("Short code is required"));
    }
    if short_url.len() > MAX_SHORT_URL_LEN {
        return Err(AppError::invalid_input("Short code is too long")
            .with_context("length", short_url.len()));
    }
    Ok(())
}

/// Best-effort client IP from forwarded headers. The service sits behind a
/// reverse proxy, so `X-Forwarded-For` (first hop) wins over `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// `GET /r/{short_url}`
///
/// Resolves the short URL and answers with the original URL as JSON; the
/// actual HTTP redirect is the caller's concern. Click ingestion is
/// spawned on its own task with a fresh deadline after the lookup
/// succeeds, so a client disconnect cannot cancel analytics.
pub async fn redirect_handler(
    Path(short_url): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<RedirectData>>, AppError> {
    validate_short_url(&short_url)?;

    let projection = state.redirect_service.get_url(&short_url).await?;

    let meta = ClickRequestMeta {
        client_ip: client_ip(&headers),
        user_agent: header_string(&headers, header::USER_AGENT),
        referrer: header_string(&headers, header::REFERER),
    };

    let click_service = state.click_service.clone();
    let deadline = state.config.click_tracking_timeout;
    tokio::spawn(async move {
        if tokio::time::timeout(deadline, click_service.track_click(meta, short_url))
            .await
            .is_err()
        {
            warn!("click tracking timed out");
        }
    });

    Ok(Json(ApiResponse::success(
        "URL retrieved successfully",
        RedirectData::from(projection),
    )))
}

/// `GET /api/info/{short_url}`
///
/// Same resolution as `/r/{short_url}` but without click tracking.
pub async fn url_info_handler(
    Path(short_url): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RedirectData>>, AppError> {
    validate_short_url(&short_url)?;

    let projection = state.redirect_service.get_url(&short_url).await?;

    Ok(Json(ApiResponse::success(
        "URL info retrieved successfully",
        RedirectData::from(projection),
    )))
}
