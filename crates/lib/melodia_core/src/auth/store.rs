//! Identity store — sqlx queries over the `users` table.

use sqlx::PgPool;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::AuthError;
use crate::models::user::{SignUp, User};

const USER_COLUMNS: &str =
    "id, version, username, email, password_hash, salt, first_name, last_name, sex, birth_date, avatar_src";

impl FromRow<'_, PgRow> for User {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let sex: String = row.try_get("sex")?;
        Ok(User {
            id: row.try_get::<i32, _>("id")? as u32,
            version: row.try_get::<i32, _>("version")? as u32,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            salt: row.try_get("salt")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            sex: sex.parse().map_err(|_| sqlx::Error::ColumnDecode {
                index: "sex".into(),
                source: format!("invalid sex value {sex:?}").into(),
            })?,
            birth_date: row.try_get("birth_date")?,
            avatar_src: row.try_get("avatar_src")?,
        })
    }
}

fn create_error(e: sqlx::Error) -> AuthError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::UserAlreadyExists,
        _ => AuthError::Db(e),
    }
}

/// Insert a new user row (version starts at 1), returning the assigned id.
pub async fn create_user(
    pool: &PgPool,
    input: &SignUp,
    password_hash: &str,
    salt_hex: &str,
) -> Result<u32, AuthError> {
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO users \
           (username, email, password_hash, salt, first_name, last_name, sex, birth_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(&input.username)
    .bind(&input.email)
    .bind(password_hash)
    .bind(salt_hex)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(input.sex.as_str())
    .bind(input.birth_date)
    .fetch_one(pool)
    .await
    .map_err(create_error)?;
    Ok(id as u32)
}

/// Fetch a user by id.
pub async fn get_user_by_id(pool: &PgPool, id: u32) -> Result<User, AuthError> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id as i32)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::NoSuchUser)
}

/// Fetch a user by username (case-sensitive).
pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<User, AuthError> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::NoSuchUser)
}

/// Fetch a user by (id, version).
///
/// A row whose stored version differs from the argument is treated as
/// missing — this is the server-side token revocation mechanism.
pub async fn get_user_by_auth_data(
    pool: &PgPool,
    id: u32,
    version: u32,
) -> Result<User, AuthError> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND version = $2"
    ))
    .bind(id as i32)
    .bind(version as i32)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::NoSuchUser)
}

/// Increment the user's version counter.
pub async fn increase_user_version(
    executor: impl sqlx::PgExecutor<'_>,
    id: u32,
) -> Result<(), AuthError> {
    let result = sqlx::query("UPDATE users SET version = version + 1 WHERE id = $1")
        .bind(id as i32)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AuthError::NoSuchUser);
    }
    Ok(())
}

/// Persist a new password hash and salt.
pub async fn update_password(
    executor: impl sqlx::PgExecutor<'_>,
    id: u32,
    password_hash: &str,
    salt_hex: &str,
) -> Result<(), AuthError> {
    let result = sqlx::query("UPDATE users SET password_hash = $2, salt = $3 WHERE id = $1")
        .bind(id as i32)
        .bind(password_hash)
        .bind(salt_hex)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AuthError::NoSuchUser);
    }
    Ok(())
}
