//! Accepts submissions and hands them to the worker pool.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::job::Job;
use super::worker_pool::WorkerPool;
use crate::logging::LogSink;
use crate::{Error, Result};

/// Acknowledgment for an accepted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTicket {
    pub job_id: String,
    pub url: String,
}

/// Validates submissions and queues them without waiting for any work.
#[derive(Clone)]
pub struct JobDispatcher {
    pool: Arc<WorkerPool>,
    sink: Arc<LogSink>,
}

impl JobDispatcher {
    pub fn new(pool: Arc<WorkerPool>, sink: Arc<LogSink>) -> Self {
        Self { pool, sink }
    }

    /// Validate `url` and queue a job for it.
    ///
    /// A missing or blank URL is rejected before any job exists. The returned
    /// ticket only means the job was queued; its outcome shows up in the log.
    pub fn submit(&self, url: Option<&str>) -> Result<JobTicket> {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::validation("URL is required"))?;

        let job = Job::new(url);
        let ticket = JobTicket {
            job_id: job.id.clone(),
            url: job.url.clone(),
        };

        // Logged before enqueueing so it precedes anything the worker writes.
        self.sink.info(format!("Job received: {}", ticket.url));

        if let Err(e) = self.pool.enqueue(job) {
            self.sink.warn(format!("Job rejected: {}", e));
            warn!(job_id = %ticket.job_id, error = %e, "Job rejected");
            return Err(e);
        }

        info!(job_id = %ticket.job_id, url = %ticket.url, "Job accepted");
        Ok(ticket)
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::orchestrator::PipelineOrchestrator;
    use crate::pipeline::test_utils::FakeCollaborators;
    use crate::pipeline::worker_pool::WorkerPoolConfig;

    fn dispatcher(config: WorkerPoolConfig) -> (JobDispatcher, Arc<LogSink>) {
        let sink = Arc::new(LogSink::new());
        let orchestrator = Arc::new(PipelineOrchestrator::new(
            FakeCollaborators::default().into_collaborators(),
            sink.clone(),
            std::env::temp_dir().join("revoice-dispatcher-test"),
        ));
        let pool = Arc::new(WorkerPool::new(orchestrator, config));
        (JobDispatcher::new(pool, sink.clone()), sink)
    }

    #[tokio::test]
    async fn test_missing_or_blank_url_is_rejected() {
        let (dispatcher, sink) = dispatcher(WorkerPoolConfig::default());

        for url in [None, Some(""), Some("   ")] {
            let err = dispatcher.submit(url).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{:?}", url);
        }
        assert!(sink.is_empty());
        assert_eq!(dispatcher.pool().queued_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_queues_and_logs() {
        let (dispatcher, sink) = dispatcher(WorkerPoolConfig::default());

        let ticket = dispatcher.submit(Some(" https://youtu.be/abc ")).unwrap();

        assert_eq!(ticket.url, "https://youtu.be/abc");
        assert!(!ticket.job_id.is_empty());
        assert_eq!(dispatcher.pool().queued_count(), 1);
        assert_eq!(sink.lines().len(), 1);
        assert!(sink.lines()[0].ends_with("Job received: https://youtu.be/abc"));
    }

    #[tokio::test]
    async fn test_submissions_are_not_deduplicated() {
        let (dispatcher, _sink) = dispatcher(WorkerPoolConfig::default());

        let a = dispatcher.submit(Some("https://youtu.be/same")).unwrap();
        let b = dispatcher.submit(Some("https://youtu.be/same")).unwrap();

        assert_ne!(a.job_id, b.job_id);
        assert_eq!(dispatcher.pool().queued_count(), 2);
    }

    #[tokio::test]
    async fn test_full_queue_surfaces_error() {
        let (dispatcher, sink) = dispatcher(WorkerPoolConfig {
            max_workers: 1,
            queue_capacity: 1,
        });

        dispatcher.submit(Some("one")).unwrap();
        let err = dispatcher.submit(Some("two")).unwrap_err();

        assert!(matches!(err, Error::QueueFull { .. }));
        let lines = sink.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("Job rejected: Job queue is full"));
    }
}
