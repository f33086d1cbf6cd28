//! Request logging middleware.
//!
//! Logs method, path, client IP (`X-Real-IP` when present, transport
//! address otherwise), status, elapsed time and the request id.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;

use super::request_id::RequestId;

pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let ip = request
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|c| c.0.to_string())
        });
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.to_string())
        .unwrap_or_default();

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms,
        ip = ip.as_deref().unwrap_or("-"),
        %request_id,
        "request"
    );
    response
}
