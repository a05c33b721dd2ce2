//! Liveness endpoint.

use axum::{response::IntoResponse, Json};
use serde::Serialize;

/// Liveness payload returned by `GET /` and `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
}

/// Health check endpoint for container orchestration.
///
/// Does not touch the database.
pub async fn health() -> impl IntoResponse {
    Json(HealthStatus {
        status: "Online",
        message: "Zoning API is live",
    })
}
