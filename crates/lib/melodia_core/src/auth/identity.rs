//! Identity service — sign-up, credential verification, password rotation.
//!
//! Argon2 is CPU-heavy (64 MiB per call), so every KDF invocation is
//! pushed onto the blocking pool.

use sqlx::PgPool;
use tracing::info;

use super::{AuthError, password, store};
use crate::models::user::{SignUp, User, validate_password};

async fn hash_blocking(plain: String, salt: [u8; password::SALT_LEN]) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&plain, &salt))
        .await
        .map_err(|e| AuthError::Internal(format!("hash task: {e}")))?
}

async fn verify_blocking(
    plain: String,
    salt_hex: String,
    expected_hash_hex: String,
) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || {
        password::verify_password(&plain, &salt_hex, &expected_hash_hex)
    })
    .await
    .map_err(|e| AuthError::Internal(format!("verify task: {e}")))?
}

/// Validate the input, hash the password with a fresh salt and insert
/// the row. Returns the assigned user id.
pub async fn sign_up(pool: &PgPool, input: &SignUp) -> Result<u32, AuthError> {
    input.validate()?;
    let salt = password::generate_salt();
    let hash = hash_blocking(input.password.clone(), salt).await?;
    let id = store::create_user(pool, input, &hash, &hex::encode(salt)).await?;
    info!(user_id = id, username = %input.username, "user signed up");
    Ok(id)
}

/// Look the user up by username and check the password.
///
/// An unknown username still burns one KDF call so the response time
/// does not reveal whether the account exists.
pub async fn verify_credentials(
    pool: &PgPool,
    username: &str,
    plain: &str,
) -> Result<User, AuthError> {
    let user = match store::get_user_by_username(pool, username).await {
        Err(AuthError::NoSuchUser) => {
            let _ = hash_blocking(plain.to_string(), password::generate_salt()).await;
            return Err(AuthError::NoSuchUser);
        }
        other => other?,
    };

    let ok = verify_blocking(
        plain.to_string(),
        user.salt.clone(),
        user.password_hash.clone(),
    )
    .await?;
    if !ok {
        return Err(AuthError::IncorrectPassword);
    }
    Ok(user)
}

/// Fetch a user by (id, version); version mismatch reads as `NoSuchUser`.
pub async fn get_by_auth_data(pool: &PgPool, id: u32, version: u32) -> Result<User, AuthError> {
    store::get_user_by_auth_data(pool, id, version).await
}

/// Bump the user's version, revoking every outstanding access token.
pub async fn bump_version(pool: &PgPool, id: u32) -> Result<(), AuthError> {
    store::increase_user_version(pool, id).await
}

/// Re-hash with a fresh salt and persist, bumping the version in the
/// same transaction so a token issued before the change can never
/// resolve against the post-change row.
pub async fn change_password(pool: &PgPool, id: u32, new_plain: &str) -> Result<(), AuthError> {
    validate_password(new_plain)?;
    let salt = password::generate_salt();
    let hash = hash_blocking(new_plain.to_string(), salt).await?;

    let mut tx = pool.begin().await.map_err(AuthError::Db)?;
    store::update_password(&mut *tx, id, &hash, &hex::encode(salt)).await?;
    store::increase_user_version(&mut *tx, id).await?;
    tx.commit().await.map_err(AuthError::Db)?;

    info!(user_id = id, "password changed");
    Ok(())
}
