// Health check endpoint

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub storage: &'static str,
    pub environment: String,
    pub version: &'static str,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let health = &state.storage.health;
    let (code, status) = match health.ping().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::error!(storage = health.backend(), "Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        },
    };

    (
        code,
        Json(HealthStatus {
            status,
            storage: health.backend(),
            environment: state.config.server.environment.to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
