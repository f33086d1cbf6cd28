//! Wire format: envelopes, methods, status codes and typed payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use melodia_core::models::user::{Sex, User};

/// Identity operations exposed over RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    SignUpUser,
    GetUserByCreds,
    GetUserByAuthData,
    IncreaseUserVersion,
    ChangePassword,
}

/// Response status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ok,
    InvalidArgument,
    AlreadyExists,
    NotFound,
    PermissionDenied,
    Internal,
}

/// One request frame.
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: Method,
    pub body: serde_json::Value,
}

/// One response frame.
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse {
    pub status: Status,
    /// Human-readable detail for non-`Ok` statuses.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

impl RpcResponse {
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status: Status::Ok,
            message: String::new(),
            body: Some(body),
        }
    }

    pub fn error(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub birth_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetUserByCredsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetUserByAuthDataRequest {
    pub user_id: u32,
    pub user_version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IncreaseUserVersionRequest {
    pub user_id: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub user_id: u32,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdReply {
    pub id: u32,
}

/// User view sent over the wire; credentials never leave the store.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserReply {
    pub id: u32,
    pub version: u32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub birth_date: NaiveDate,
    pub avatar_src: String,
}

impl From<&User> for UserReply {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            version: user.version,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            sex: user.sex,
            birth_date: user.birth_date,
            avatar_src: user.avatar_src.clone(),
        }
    }
}
