//! Authentication request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use axum_extra::extract::CookieJar;
use serde_json::{Value, json};

use melodia_core::auth::{identity, session, store, tokens};

use crate::AppState;
use crate::error::{ApiError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AuthStatusResponse, ChangePasswordRequest, IdResponse, LoginRequest, SignUpRequest,
};
use crate::services::cookies;

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.to_string())
}

/// `POST /api/auth/signup` — create a new account.
pub async fn signup_handler(
    State(state): State<AppState>,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> AppResult<Json<IdResponse>> {
    let Json(body) = body.map_err(bad_body)?;
    let input = body.into_domain()?;
    let id = identity::sign_up(&state.pool, &input).await?;
    Ok(Json(IdResponse { id }))
}

/// `POST /api/auth/login` — authenticate and set the access cookie.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<IdResponse>)> {
    let Json(body) = body.map_err(bad_body)?;
    let (user, token) = session::login(
        &state.pool,
        &body.username,
        &body.password,
        state.config.access_secret.as_bytes(),
    )
    .await?;
    Ok((
        jar.add(cookies::access_cookie(&token)),
        Json(IdResponse { id: user.id }),
    ))
}

/// `GET /api/auth/` — asserts an authenticated session; 403 otherwise.
pub async fn auth_handler(
    user: Option<Extension<AuthenticatedUser>>,
) -> AppResult<Json<AuthStatusResponse>> {
    if user.is_none() {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(AuthStatusResponse { auth: true }))
}

/// `GET /api/auth/check` — reports whether a session is attached.
pub async fn check_handler(user: Option<Extension<AuthenticatedUser>>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        auth: user.is_some(),
    })
}

/// `GET /api/auth/logout` — bump the user version and clear the cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<Extension<AuthenticatedUser>>,
) -> AppResult<(CookieJar, Json<Value>)> {
    let Extension(user) = user.ok_or(ApiError::Unauthorized)?;
    session::logout(&state.pool, user.0.id).await?;
    Ok((
        jar.add(cookies::clear_access_cookie()),
        Json(json!({"status": "ok"})),
    ))
}

/// `POST /api/auth/changepass` — rotate password, salt and cookie.
///
/// The version bump inside `change_password` invalidates every token
/// issued before the change; a fresh token for the new version is set
/// so the caller stays logged in.
pub async fn change_password_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<Extension<AuthenticatedUser>>,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<Value>)> {
    let Extension(user) = user.ok_or(ApiError::Unauthorized)?;
    let Json(body) = body.map_err(bad_body)?;

    identity::verify_credentials(&state.pool, &user.0.username, &body.old_password).await?;
    identity::change_password(&state.pool, user.0.id, &body.new_password).await?;

    let fresh = store::get_user_by_id(&state.pool, user.0.id).await?;
    let token = tokens::issue_access(
        fresh.id,
        fresh.version,
        state.config.access_secret.as_bytes(),
    )?;
    Ok((
        jar.add(cookies::access_cookie(&token)),
        Json(json!({"status": "ok"})),
    ))
}
