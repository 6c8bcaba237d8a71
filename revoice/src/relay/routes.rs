use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::client::RelayClient;
use crate::api::models::LogsResponse;

#[derive(Clone)]
pub struct RelayState {
    pub client: RelayClient,
}

/// Browser form body.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub video_url: Option<String>,
}

pub fn create_router(state: RelayState) -> Router {
    Router::new()
        .route("/submit", post(submit))
        .route("/logs", get(logs))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "status": "error", "message": message.into() })),
    )
        .into_response()
}

async fn submit(
    State(state): State<RelayState>,
    payload: Result<Form<SubmitForm>, FormRejection>,
) -> Response {
    let form = match payload {
        Ok(Form(form)) => form,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };
    let Some(url) = form
        .video_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Please enter a URL");
    };

    match state.client.submit(url).await {
        Ok((status, body)) => (status, Json(body)).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to forward submission to worker");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Relay the worker log. Failures become a single log line so pollers keep going.
async fn logs(State(state): State<RelayState>) -> Json<LogsResponse> {
    let logs = match state.client.fetch_logs().await {
        Ok(logs) => logs,
        Err(e) => vec![format!("Log fetch error: {}", e)],
    };
    Json(LogsResponse { logs })
}
