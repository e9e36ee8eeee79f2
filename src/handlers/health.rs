//! Health check endpoints.

use std::time::Instant;

use axum::{extract::State, response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub environment: String,
    pub dependencies: Vec<ServiceHealth>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceHealth {
    pub name: String,
    pub status: String,
    pub response_time_ms: Option<u64>,
    pub error_message: Option<String>,
}

impl HealthStatus {
    fn new(environment: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: environment.to_string(),
            dependencies: Vec::new(),
        }
    }

    fn add_dependency_check(
        &mut self,
        name: &str,
        is_healthy: bool,
        response_time: Option<u64>,
        error: Option<String>,
    ) {
        self.dependencies.push(ServiceHealth {
            name: name.to_string(),
            status: if is_healthy {
                "healthy".to_string()
            } else {
                "unhealthy".to_string()
            },
            response_time_ms: response_time,
            error_message: error,
        });

        if !is_healthy {
            self.status = "degraded".to_string();
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(health_status))
}

/// Basic liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness check including the backing store
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Detailed health status", body = HealthStatus))
)]
pub async fn health_status(State(state): State<AppState>) -> Json<HealthStatus> {
    let mut health = HealthStatus::new(&state.config.environment);

    let started = Instant::now();
    match state.store.ping().await {
        Ok(()) => {
            health.add_dependency_check(
                "store",
                true,
                Some(started.elapsed().as_millis() as u64),
                None,
            );
        }
        Err(e) => {
            health.add_dependency_check("store", false, None, Some(e.to_string()));
        }
    }

    Json(health)
}
