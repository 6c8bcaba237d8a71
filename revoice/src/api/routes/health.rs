//! Health check route.

use axum::{Json, Router, extract::State, routing::get};

use crate::api::models::HealthResponse;
use crate::api::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Liveness plus worker pool load.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pool = state.dispatcher.pool();
    let status = if pool.is_running() {
        "healthy"
    } else {
        "shutting_down"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        queued_jobs: pool.queued_count(),
        active_jobs: pool.active_count(),
    })
}
