//! Service info and health check endpoints.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Service info response
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub environment: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Service version
    pub version: String,

    /// Per-store health
    pub storage: StorageChecks,
}

/// Whether each store answered its probe
#[derive(Debug, Serialize, Deserialize)]
pub struct StorageChecks {
    pub models: bool,
    pub datasets: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        status: "active".to_string(),
        message: "ML benchmark service is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
    })
}

/// Probes both stores; answers 503 when either is unavailable.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = state.stores.health().await;
    let healthy = health.healthy();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: StorageChecks {
            models: health.artifacts.healthy,
            datasets: health.datasets.healthy,
        },
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
