//! Job submission.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};

use crate::api::error::ApiResult;
use crate::api::models::{AcceptedResponse, ProcessRequest};
use crate::api::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit))
}

/// Accept a URL for background processing. Returns before any work starts.
async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AcceptedResponse>)> {
    let Json(request) = payload?;

    let ticket = state.dispatcher.submit(request.url.as_deref())?;

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse {
            status: "accepted".to_string(),
            message: format!("Processing started for {}", ticket.url),
            job_id: ticket.job_id,
        }),
    ))
}
