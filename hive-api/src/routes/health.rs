//! Health Check Endpoints
//!
//! - `/ping` - plain pong
//! - `/health/live` - process alive
//! - `/health/ready` - event dispatcher running (503 otherwise)
//!
//! No authentication required for health endpoints.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use hive_events::{Dispatcher, StatsSnapshot};
use serde::{Deserialize, Serialize};

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDetails {
    pub dispatcher: HealthStatus,
    pub subscribers: u64,
    pub published: u64,
    pub version: String,
    pub uptime_seconds: u64,
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct HealthState {
    pub dispatcher: Dispatcher,
    pub start_time: Instant,
}

impl HealthState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /ping
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live
pub async fn liveness() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Process is alive".to_string()),
        details: None,
    };
    (StatusCode::OK, Json(response))
}

/// GET /health/ready
pub async fn readiness(State(state): State<HealthState>) -> impl IntoResponse {
    let status = if state.dispatcher.is_running() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };
    let stats: StatsSnapshot = state.dispatcher.stats();

    let response = HealthResponse {
        status,
        message: (status == HealthStatus::Unhealthy)
            .then(|| "Event dispatcher is not running".to_string()),
        details: Some(HealthDetails {
            dispatcher: status,
            subscribers: stats.subscribers,
            published: stats.published,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        }),
    };

    let status_code = if status == HealthStatus::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Health check router (no auth required), nested at `/health`.
pub fn create_router(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(HealthState::new(dispatcher))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() -> Result<(), serde_json::Error> {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            message: Some("Process is alive".to_string()),
            details: None,
        };
        let json = serde_json::to_value(&response)?;
        assert_eq!(json["status"], "healthy");
        assert!(json.get("details").is_none());
        Ok(())
    }
}
