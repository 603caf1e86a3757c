/*!
 * # Health Check Module
 *
 * - Liveness check (`/health`) - process is up, with version and uptime
 * - Readiness check (`/health/ready`) - the facility store answers a ping
 * - Version info (`/health/version`)
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, error};

use crate::repositories::FacilityRepository;

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Health check detail
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Overall health information
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub details: HashMap<String, HealthDetail>,
}

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub repository: Arc<dyn FacilityRepository>,
    pub start_time: SystemTime,
}

impl HealthState {
    pub fn new(repository: Arc<dyn FacilityRepository>) -> Self {
        Self {
            repository,
            start_time: SystemTime::now(),
        }
    }

    /// Calculate system uptime
    pub fn uptime(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or(Duration::from_secs(0))
            .as_secs()
    }

    /// Probes the store and reports the combined status
    pub async fn check(&self) -> HealthInfo {
        let store = match self.repository.ping().await {
            Ok(()) => HealthDetail {
                status: HealthStatus::Up,
                message: Some(self.repository.backend_name().to_string()),
                timestamp: Utc::now(),
            },
            Err(e) => {
                error!("Facility store health check failed: {}", e);
                HealthDetail {
                    status: HealthStatus::Down,
                    message: Some(e.response_message()),
                    timestamp: Utc::now(),
                }
            }
        };

        let status = store.status.clone();
        let mut details = HashMap::new();
        details.insert("store".to_string(), store);

        HealthInfo {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            uptime_seconds: self.uptime(),
            details,
        }
    }
}

/// Returns build and version information
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "commit": option_env!("GIT_HASH").unwrap_or("unknown"),
    }))
}

/// Liveness endpoint; never touches the store
pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    debug!("Health check endpoint called");

    (
        StatusCode::OK,
        Json(json!({
            "status": HealthStatus::Up,
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": state.uptime(),
            "timestamp": Utc::now(),
        })),
    )
}

/// Readiness endpoint
pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    debug!("Readiness check endpoint called");

    let health = state.check().await;
    let status_code = match health.status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status_code,
        Json(json!({
            "ready": health.status == HealthStatus::Up,
            "timestamp": health.timestamp,
            "details": health.details,
        })),
    )
}

/// Creates router with health check endpoints
pub fn health_routes<S>(repository: Arc<dyn FacilityRepository>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let health_state = Arc::new(HealthState::new(repository));

    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/version", get(version_info))
        .with_state(health_state)
}
