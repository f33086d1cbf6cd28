//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, info};

use crate::models::MessageResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, ApiError>;

/// Application-level errors with HTTP status mapping.
///
/// Clients only ever see the canonical message for the error kind;
/// details stay in the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid url parameter")]
    InvalidUrlParam,

    #[error("User not found")]
    UserNotFound,

    #[error("Password mismatch")]
    PasswordMismatch,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Token check failed")]
    TokenCheckFailed,

    #[error("Auth data check failed")]
    AuthDataCheckFailed,

    #[error("Invalid CSRF token")]
    InvalidCsrfToken,

    #[error("Unauthenticated")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code and canonical client-visible message.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "incorrect input body"),
            ApiError::InvalidUrlParam => (StatusCode::BAD_REQUEST, "invalid url parameter"),
            ApiError::UserNotFound => (StatusCode::BAD_REQUEST, "user not found"),
            ApiError::PasswordMismatch => (StatusCode::BAD_REQUEST, "password mismatch"),
            ApiError::UserAlreadyExists => (StatusCode::BAD_REQUEST, "user already exists"),
            ApiError::TokenCheckFailed => (StatusCode::BAD_REQUEST, "token check failed"),
            ApiError::AuthDataCheckFailed => (StatusCode::BAD_REQUEST, "auth data check failed"),
            ApiError::InvalidCsrfToken => (StatusCode::BAD_REQUEST, "invalid CSRF token"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(detail = %self, status = status.as_u16(), "request failed");
        } else {
            info!(detail = %self, status = status.as_u16(), "request rejected");
        }
        let body = Json(MessageResponse {
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<melodia_core::auth::AuthError> for ApiError {
    fn from(e: melodia_core::auth::AuthError) -> Self {
        use melodia_core::auth::AuthError;
        match e {
            AuthError::Validation(msg) => ApiError::Validation(msg),
            AuthError::UserAlreadyExists => ApiError::UserAlreadyExists,
            AuthError::NoSuchUser => ApiError::UserNotFound,
            AuthError::IncorrectPassword => ApiError::PasswordMismatch,
            AuthError::TokenInvalid | AuthError::TokenExpired => ApiError::TokenCheckFailed,
            AuthError::Forbidden => ApiError::Forbidden,
            AuthError::Db(e) => ApiError::Internal(e.to_string()),
            AuthError::Crypto(msg) | AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}
