use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{error::ApiError, state::AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: &'static str,
    database: &'static str,
}

/// Readiness check endpoint
///
/// Ready once the account database answers a key lookup.
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    state
        .accounts
        .registry()
        .find_by_id("readiness-probe")
        .await
        .map_err(|e| ApiError::Unavailable(format!("Document store: {}", e)))?;

    Ok(Json(ReadinessResponse {
        status: "ready",
        database: state.accounts.registry().store().name(),
    }))
}
