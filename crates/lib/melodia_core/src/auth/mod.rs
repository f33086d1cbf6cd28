//! Identity, session and token logic.
//!
//! Provides password hashing, the signed token codec, the user store
//! and the identity/session/CSRF services built on top of them, shared
//! across `melodia_api` and `melodia_rpc`.

pub mod csrf;
pub mod identity;
pub mod password;
pub mod session;
pub mod store;
pub mod tokens;

use thiserror::Error;

/// Authentication and identity errors.
///
/// The HTTP and RPC boundaries pattern-match on these kinds; middle
/// layers must preserve them when adding context.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("No such user")]
    NoSuchUser,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Token invalid")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
