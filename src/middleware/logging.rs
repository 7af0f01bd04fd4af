//! Request logging middleware.
//!
//! Logs every HTTP request with method, path, status code, and latency.
//! Header values are never logged, so credentials cannot leak this way.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{info, warn};

/// Middleware that logs HTTP requests with timing information.
///
/// INFO for completed requests, WARN for 5xx. The client IP is included
/// when the server was started with connect info; in-process tests run
/// without it.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Skip logging for health checks to reduce noise
    if path == "/health" {
        return next.run(request).await;
    }

    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let latency = start.elapsed();

    let status = response.status().as_u16();
    let client_ip = client_ip.as_deref().unwrap_or("-");

    if status >= 500 {
        warn!(
            method = %method,
            path = %path,
            status,
            latency_ms = latency.as_millis() as u64,
            client_ip,
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status,
            latency_ms = latency.as_millis() as u64,
            client_ip,
            "Request completed"
        );
    }

    response
}
