//! Liveness check.

use axum::Json;

use crate::models::HealthResponse;

/// `GET /health`: process is up.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: gatehouse_core::version().to_string(),
    })
}
