//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health/
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = state.repositories.health_check().await.unwrap_or(false);
    let storage_ok = state.blobs.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: if database_ok && storage_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: state.repositories.provider_name().to_string(),
        database_ok,
        storage_ok,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
