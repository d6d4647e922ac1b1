//! Per-request deadline from `server.request_timeout`.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Answers 408 when the handler does not finish within the configured
/// number of seconds. The body is filled in by the global error handler.
pub async fn timeout_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let limit = Duration::from_secs(state.settings.server.request_timeout);
    let path = request.uri().path().to_owned();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(path = %path, timeout_secs = limit.as_secs(), "request timed out");
            StatusCode::REQUEST_TIMEOUT.into_response()
        }
    }
}
