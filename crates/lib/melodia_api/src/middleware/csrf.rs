//! CSRF middleware for state-changing routes.
//!
//! Requires the authorization middleware to have attached a user;
//! the `X-CSRF-Token` header must verify and reference that user.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use melodia_core::auth::csrf;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::cookies::CSRF_HEADER;

pub async fn verify_csrf(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(ApiError::Unauthorized)?;

    let token = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::InvalidCsrfToken)?;

    csrf::check(token, user.0.id, state.config.csrf_secret.as_bytes())
        .map_err(|_| ApiError::InvalidCsrfToken)?;

    Ok(next.run(request).await)
}
