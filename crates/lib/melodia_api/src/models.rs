//! Request and response bodies for the HTTP surface.
//!
//! Wire field names are camelCase; domain models in `melodia_core`
//! stay snake_case.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use melodia_core::models::user::{SignUp, User};

use crate::error::ApiError;

/// Uniform error body: `{"message": "<short string>"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `{"id": <u32>}` returned by signup and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: u32,
}

/// `{"auth": <bool>}` returned by the auth probes.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub auth: bool,
}

/// `{"csrf": "<token>"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CsrfResponse {
    pub csrf: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
    pub birth_date: String,
}

impl SignUpRequest {
    /// Parse the wire form into validated-shape domain input. Field
    /// range checks happen later in `identity::sign_up`.
    pub fn into_domain(self) -> Result<SignUp, ApiError> {
        let sex = self
            .sex
            .parse()
            .map_err(|_| ApiError::Validation("invalid sex".into()))?;
        let birth_date = NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d")
            .map_err(|_| ApiError::Validation("invalid birth date".into()))?;
        Ok(SignUp {
            username: self.username,
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            sex,
            birth_date,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Public profile view of a user (no credentials).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: u32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
    pub birth_date: String,
    pub avatar_src: String,
}

impl From<&User> for UserProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            sex: user.sex.as_str().to_string(),
            birth_date: user.birth_date.format("%Y-%m-%d").to_string(),
            avatar_src: user.avatar_src.clone(),
        }
    }
}
