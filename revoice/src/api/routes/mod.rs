//! API route modules.

pub mod health;
pub mod logging;
pub mod logs;
pub mod process;

use axum::Router;

use crate::api::server::AppState;

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/process", process::router())
        .nest("/logs", logs::router())
        .nest("/logging", logging::router())
        .nest("/health", health::router())
        .with_state(state)
}

/// State backed by fake collaborators with an unstarted pool.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, std::sync::Arc<crate::logging::LogSink>) {
    use std::sync::Arc;

    use crate::logging::LogSink;
    use crate::pipeline::test_utils::FakeCollaborators;
    use crate::pipeline::{JobDispatcher, PipelineOrchestrator, WorkerPool, WorkerPoolConfig};

    let sink = Arc::new(LogSink::new());
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        FakeCollaborators::default().into_collaborators(),
        sink.clone(),
        std::env::temp_dir().join("revoice-api-test"),
    ));
    let pool = Arc::new(WorkerPool::new(
        orchestrator,
        WorkerPoolConfig {
            max_workers: 1,
            queue_capacity: 2,
        },
    ));
    let dispatcher = JobDispatcher::new(pool, sink.clone());
    (AppState::new(sink.clone(), dispatcher), sink)
}
