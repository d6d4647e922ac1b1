//! Health check DTOs for API responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response structure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2025-01-01T12:00:00Z",
    "uptimeSeconds": 3600,
    "checks": {
        "cache": { "status": "healthy", "message": "memory", "responseTimeMs": 0 },
        "database": { "status": "healthy", "message": "Connected", "responseTimeMs": 5 }
    }
}))]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: jiff::Timestamp,
    pub uptime_seconds: u64,
    /// Per-component results keyed by component name
    pub checks: BTreeMap<String, ComponentHealth>,
}

/// Ordered from best to worst, so the overall status is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Some non-critical issues
    Degraded,
    /// Critical issues present
    Unhealthy,
}

impl HealthStatus {
    pub fn overall<'a>(checks: impl IntoIterator<Item = &'a ComponentHealth>) -> Self {
        checks
            .into_iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[schema(example = "Connected")]
    pub message: Option<String>,
    #[schema(example = 5)]
    pub response_time_ms: Option<u64>,
}

impl ComponentHealth {
    pub fn new(status: HealthStatus, message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            status,
            message: Some(message.into()),
            response_time_ms: Some(elapsed_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
    }

    #[test]
    fn test_overall_status_is_worst_component() {
        let db = ComponentHealth::new(HealthStatus::Healthy, "Connected", 3);
        let cache = ComponentHealth::new(HealthStatus::Degraded, "redis unreachable", 1);
        assert_eq!(HealthStatus::overall([&db, &cache]), HealthStatus::Degraded);

        let down = ComponentHealth::new(HealthStatus::Unhealthy, "Connection failed", 5000);
        assert_eq!(
            HealthStatus::overall([&db, &cache, &down]),
            HealthStatus::Unhealthy
        );
        assert_eq!(HealthStatus::overall([]), HealthStatus::Healthy);
    }

    #[test]
    fn test_response_field_names() {
        let mut checks = BTreeMap::new();
        checks.insert(
            "database".to_string(),
            ComponentHealth::new(HealthStatus::Healthy, "Connected", 5),
        );
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            timestamp: jiff::Timestamp::UNIX_EPOCH,
            uptime_seconds: 12,
            checks,
        };

        let body = serde_json::to_value(response).unwrap();
        assert_eq!(body["uptimeSeconds"], 12);
        assert_eq!(body["checks"]["database"]["responseTimeMs"], 5);
        assert_eq!(body["timestamp"], "1970-01-01T00:00:00Z");
    }
}
