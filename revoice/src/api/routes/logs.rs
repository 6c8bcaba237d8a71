//! Job progress log query.

use axum::{Json, Router, extract::State, routing::get};

use crate::api::models::LogsResponse;
use crate::api::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_logs))
}

/// Snapshot of the job progress log, oldest first.
async fn list_logs(State(state): State<AppState>) -> Json<LogsResponse> {
    Json(LogsResponse {
        logs: state.sink.lines(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::{create_router, test_state};
    use crate::logging::LOG_CAPACITY;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_logs(router: axum::Router) -> LogsResponse {
        let response = router
            .oneshot(Request::builder().uri("/logs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_empty_log() {
        let (state, _sink) = test_state();
        assert!(get_logs(create_router(state)).await.logs.is_empty());
    }

    #[tokio::test]
    async fn test_logs_are_ordered_and_bounded() {
        let (state, sink) = test_state();
        for i in 0..(LOG_CAPACITY + 5) {
            sink.info(format!("message {}", i));
        }

        let logs = get_logs(create_router(state)).await.logs;

        assert_eq!(logs.len(), LOG_CAPACITY);
        assert!(logs[0].ends_with("message 5"));
        assert!(logs[LOG_CAPACITY - 1].ends_with(&format!("message {}", LOG_CAPACITY + 4)));
        assert!(logs[0].starts_with('['));
    }
}
