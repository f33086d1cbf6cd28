//! HTTP request handlers.

pub mod auth;
pub mod csrf;
pub mod users;
