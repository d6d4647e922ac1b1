//! Health check endpoint.
//!
//! Checks the database pool directly and round-trips the cache backend.
//! A broken cache only degrades the service since every read falls back to
//! the database.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health_check))
}

/// GET /health - Liveness plus database and cache status
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = BTreeMap::new();
    checks.insert("database".to_string(), check_database(&state).await);
    checks.insert("cache".to_string(), check_cache(&state).await);

    let status = HealthStatus::overall(checks.values());
    let response = HealthResponse {
        status,
        version: crate::pkg_version().to_string(),
        timestamp: jiff::Timestamp::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        checks,
    };

    (status_code(status), Json(response))
}

fn status_code(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

async fn check_database(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    match state.services.jobs.ping().await {
        Ok(()) => ComponentHealth::new(HealthStatus::Healthy, "Connected", elapsed_ms(start)),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            ComponentHealth::new(
                HealthStatus::Unhealthy,
                format!("Query failed: {e}"),
                elapsed_ms(start),
            )
        }
    }
}

async fn check_cache(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let backend = state.cache.backend_name();
    if state.cache.ping().await {
        ComponentHealth::new(HealthStatus::Healthy, backend, elapsed_ms(start))
    } else {
        ComponentHealth::new(
            HealthStatus::Degraded,
            format!("{backend} unreachable"),
            elapsed_ms(start),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_still_serves_traffic() {
        assert_eq!(status_code(HealthStatus::Healthy), StatusCode::OK);
        assert_eq!(status_code(HealthStatus::Degraded), StatusCode::OK);
        assert_eq!(
            status_code(HealthStatus::Unhealthy),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
