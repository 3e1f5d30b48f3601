//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

use healthai_services::CacheStats;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    /// Pool cache statistics (absent when the news provider is not configured)
    news_cache: Option<CacheStats>,
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let news_cache = match &state.news_cache {
        Some(cache) => Some(cache.stats().await),
        None => None,
    };

    let response = HealthResponse {
        status: "healthy".to_string(),
        news_cache,
    };

    (StatusCode::OK, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
