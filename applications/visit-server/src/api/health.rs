/// Health check API routes
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the store cannot be read
    pub status: String,
    pub version: String,
}

/// GET /api/health - Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.store.count().await {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Health check could not read the store: {}", e);
            "degraded"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
