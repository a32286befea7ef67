//! Bearer token authentication and role enforcement.
//!
//! `authenticate` always runs before any role guard: the role check reads
//! the claims that authentication placed in the request extensions.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::domain::entities::UserClaims;
use crate::error::AppError;
use crate::state::AppState;

/// Enforces the `Authorization: Bearer <token>` scheme.
///
/// On success the verified [`UserClaims`] are inserted into the request
/// extensions for handlers and downstream guards.
///
/// # Errors
///
/// - `UNAUTHORIZED` when the header is missing, malformed, or carries a
///   subject that cannot be mapped to a user
/// - token verification failures keep their own kinds
///   (`TOKEN_EXPIRED`, `INVALID_TOKEN`, `INVALID_SIGNING_KEY`)
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::unauthorized().with_detail("authorization header missing or not UTF-8")
        })?;

    let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::unauthorized().with_detail("authorization scheme must be Bearer")
    })?;

    let claims = state.token_verifier.verify(token)?;

    if claims.user_id <= 0 {
        return Err(AppError::unauthorized()
            .with_detail("token subject does not resolve to a user id"));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Restricts a route to the `admin` role. Requires [`authenticate`] to have
/// run first.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<UserClaims>()
        .ok_or_else(|| AppError::unauthorized().with_detail("role guard ran without claims"))?;

    if !claims.is_admin() {
        return Err(AppError::forbidden().with_context("role", claims.role.clone()));
    }

    Ok(next.run(req).await)
}
