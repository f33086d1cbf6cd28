//! Per-request middleware chain.
//!
//! Applied in fixed order: panic guard outermost, then request id,
//! logging, authorization, and per-route CSRF / owner checks. The
//! request id must precede logging; authorization must precede CSRF
//! because the CSRF check needs the resolved user.

pub mod auth;
pub mod csrf;
pub mod logging;
pub mod owner;
pub mod panic;
pub mod request_id;
