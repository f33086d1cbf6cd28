//! Supporting services for the HTTP layer.

pub mod cookies;
