//! Runtime control of the diagnostic log filter.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::get,
};

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::LogFilterBody;
use crate::api::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/filter", get(get_filter).put(set_filter))
}

async fn get_filter(State(state): State<AppState>) -> ApiResult<Json<LogFilterBody>> {
    let config = state
        .logging_config
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Logging configuration is not available"))?;

    Ok(Json(LogFilterBody {
        filter: config.get_filter(),
    }))
}

/// Replace the filter directive, e.g. `revoice=debug,tower_http=info`.
async fn set_filter(
    State(state): State<AppState>,
    payload: Result<Json<LogFilterBody>, JsonRejection>,
) -> ApiResult<Json<LogFilterBody>> {
    let Json(body) = payload?;
    let config = state
        .logging_config
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Logging configuration is not available"))?;

    config
        .set_filter(&body.filter)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(LogFilterBody {
        filter: config.get_filter(),
    }))
}
