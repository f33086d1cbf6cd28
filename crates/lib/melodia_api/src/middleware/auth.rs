//! Authorization middleware — access-cookie extraction and session
//! resolution.
//!
//! A missing or empty cookie is not an error: the request continues
//! without an attached user and downstream handlers decide whether
//! that is fatal. A present-but-bad cookie is rejected with 400 and
//! the cookie is cleared so the browser stops replaying it.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use melodia_core::auth::{AuthError, session};
use melodia_core::models::user::User;

use crate::AppState;
use crate::error::ApiError;
use crate::models::MessageResponse;
use crate::services::cookies;

/// Key used to store the resolved user in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

fn reject_and_clear_cookie(message: &str) -> Response {
    let mut response = (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response();
    let cleared = cookies::clear_access_cookie().to_string();
    if let Ok(value) = cleared.parse() {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Axum middleware: resolves the `X-ACCESS-Token` cookie into an
/// `AuthenticatedUser` extension.
pub async fn authorize(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match jar.get(cookies::ACCESS_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
        // Anonymous fall-through.
        _ => return next.run(request).await,
    };

    match session::resolve(&state.pool, &token, state.config.access_secret.as_bytes()).await {
        Ok(user) => {
            request.extensions_mut().insert(AuthenticatedUser(user));
            next.run(request).await
        }
        Err(AuthError::TokenInvalid | AuthError::TokenExpired) => {
            reject_and_clear_cookie("token check failed")
        }
        Err(AuthError::NoSuchUser) => reject_and_clear_cookie("auth data check failed"),
        Err(e) => ApiError::from(e).into_response(),
    }
}
