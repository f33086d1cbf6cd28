//! Session service — login, logout and access-token resolution.
//!
//! There is no session table: an access token is valid exactly while
//! the user's version matches the one it was issued with.

use sqlx::PgPool;

use super::{AuthError, identity, tokens};
use crate::models::user::User;

/// Verify credentials and issue an access token for the current version.
pub async fn login(
    pool: &PgPool,
    username: &str,
    plain: &str,
    access_secret: &[u8],
) -> Result<(User, String), AuthError> {
    let user = identity::verify_credentials(pool, username, plain).await?;
    let token = tokens::issue_access(user.id, user.version, access_secret)?;
    Ok((user, token))
}

/// Global logout: one version bump invalidates every issued token.
pub async fn logout(pool: &PgPool, user_id: u32) -> Result<(), AuthError> {
    identity::bump_version(pool, user_id).await
}

/// Resolve an access token to its user.
///
/// Three distinct outcomes: the user, `TokenInvalid`/`TokenExpired`
/// for a bad token, or `NoSuchUser` for an unknown id or stale version.
pub async fn resolve(pool: &PgPool, token: &str, access_secret: &[u8]) -> Result<User, AuthError> {
    let (id, version) = tokens::verify_access(token, access_secret)?;
    identity::get_by_auth_data(pool, id, version).await
}
