//! Access logging middleware.
//!
//! Every request runs inside an `http_request` span carrying the method,
//! path and request ID, so log lines emitted by handlers and services are
//! correlated with the request that caused them.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, Level};

use super::RequestId;

pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let span = tracing::span!(
        Level::INFO,
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id
    );

    async move {
        tracing::debug!("request received");

        let start = Instant::now();
        let response = next.run(request).await;
        let status = response.status().as_u16();
        let duration_ms = start.elapsed().as_millis() as u64;

        if response.status().is_server_error() {
            tracing::warn!(status, duration_ms, "request completed with server error");
        } else {
            tracing::info!(status, duration_ms, "request completed");
        }

        response
    }
    .instrument(span)
    .await
}
