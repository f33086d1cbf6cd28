//! CSRF token handler.

use axum::extract::State;
use axum::{Extension, Json};

use melodia_core::auth::csrf;

use crate::AppState;
use crate::error::{ApiError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::CsrfResponse;

/// `GET /api/csrf` — mint a CSRF token for the authenticated user.
pub async fn get_csrf_handler(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
) -> AppResult<Json<CsrfResponse>> {
    let Extension(user) = user.ok_or(ApiError::Unauthorized)?;
    let token = csrf::mint(user.0.id, state.config.csrf_secret.as_bytes())?;
    Ok(Json(CsrfResponse { csrf: token }))
}
