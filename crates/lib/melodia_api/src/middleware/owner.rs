//! Owner check — the `{userID}` path parameter must equal the
//! authenticated user's id.

use std::collections::HashMap;

use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedUser;

/// Path parameter naming the route owner.
pub const USER_ID_PARAM: &str = "userID";

pub async fn check_owner(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = params.get(USER_ID_PARAM).ok_or(ApiError::InvalidUrlParam)?;
    let path_user_id: u32 = raw.parse().map_err(|_| ApiError::InvalidUrlParam)?;
    if path_user_id == 0 {
        return Err(ApiError::InvalidUrlParam);
    }

    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(ApiError::Unauthorized)?;
    if user.0.id != path_user_id {
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(request).await)
}
