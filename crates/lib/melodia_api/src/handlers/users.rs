//! User profile handlers.

use axum::{Extension, Json};

use crate::error::{ApiError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::UserProfileResponse;

/// `GET /api/users/{userID}` — profile of the route owner.
///
/// The owner middleware has already checked that the path id equals
/// the authenticated user's id.
pub async fn get_user_handler(
    user: Option<Extension<AuthenticatedUser>>,
) -> AppResult<Json<UserProfileResponse>> {
    let Extension(user) = user.ok_or(ApiError::Unauthorized)?;
    Ok(Json(UserProfileResponse::from(&user.0)))
}
