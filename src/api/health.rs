//! Liveness probe

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::api::middleware::{ApiError, AppState};

/// GET /health - Ping the database
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.pool.ping().await.map_err(|e| {
        tracing::error!("Health check failed: {:#}", e);
        ApiError::internal_error("Database tidak tersedia")
    })?;

    Ok(Json(json!({ "status": "ok" })))
}
