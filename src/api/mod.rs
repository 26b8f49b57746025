//! API layer - HTTP handlers and routing
//!
//! Endpoints:
//! - `GET /history` - device usage history of the session's user
//! - `GET /health` - database liveness probe

pub mod health;
pub mod history;
pub mod middleware;
pub mod responses;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{any, get},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState};

/// Build the API routes
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        // Every verb reaches the method guard so non-GET gets the JSON 405 body
        .route("/history", any(history::get_device_history))
        .route_layer(axum_middleware::from_fn(middleware::require_read_method))
        .route("/health", get(health::health_check))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    // Credentials allowed so the client can send the session cookie
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE])
        .allow_credentials(true);

    Ok(build_api_router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
