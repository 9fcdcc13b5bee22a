use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Current Unix time in seconds.
    pub timestamp: i64,
}

/// GET /health -- liveness probe; does not touch the job registry.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "codearch",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
