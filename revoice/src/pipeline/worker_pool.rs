//! Worker pool that runs accepted jobs in the background.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::job::Job;
use super::orchestrator::PipelineOrchestrator;
use crate::{Error, Result};

/// Configuration for a worker pool.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Maximum concurrent jobs.
    pub max_workers: usize,
    /// Accepted jobs that may wait for a free worker before submissions are refused.
    pub queue_capacity: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 2,
            queue_capacity: 16,
        }
    }
}

/// A fixed set of workers pulling jobs from a bounded queue.
///
/// Every job runs in its own task, so a panic inside the pipeline is reported
/// as a failed job and the worker moves on to the next one.
pub struct WorkerPool {
    config: WorkerPoolConfig,
    orchestrator: Arc<PipelineOrchestrator>,
    sender: mpsc::Sender<Job>,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<Job>>>,
    /// Jobs accepted but not yet picked up.
    queued: Arc<AtomicUsize>,
    /// Jobs currently running.
    active: Arc<AtomicUsize>,
    cancellation_token: CancellationToken,
    tasks: parking_lot::Mutex<Option<JoinSet<()>>>,
}

impl WorkerPool {
    pub fn new(orchestrator: Arc<PipelineOrchestrator>, config: WorkerPoolConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        Self {
            config,
            orchestrator,
            sender,
            receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
            queued: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
            cancellation_token: CancellationToken::new(),
            tasks: parking_lot::Mutex::new(Some(JoinSet::new())),
        }
    }

    /// Spawn the workers. Calling this more than once adds no extra workers.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock();
        let Some(join_set) = tasks.as_mut() else {
            warn!("Worker pool already stopped; not starting");
            return;
        };
        if !join_set.is_empty() {
            return;
        }

        info!(
            "Starting worker pool with {} workers (queue capacity {})",
            self.config.max_workers, self.config.queue_capacity
        );

        for i in 0..self.config.max_workers {
            let receiver = self.receiver.clone();
            let orchestrator = self.orchestrator.clone();
            let queued = self.queued.clone();
            let active = self.active.clone();
            let cancellation_token = self.cancellation_token.clone();

            join_set.spawn(async move {
                debug!("Worker {} started", i);

                loop {
                    let job = tokio::select! {
                        _ = cancellation_token.cancelled() => break,
                        job = async { receiver.lock().await.recv().await } => job,
                    };
                    let Some(job) = job else {
                        break;
                    };

                    queued.fetch_sub(1, Ordering::SeqCst);
                    active.fetch_add(1, Ordering::SeqCst);
                    debug!("Worker {} picked up job {}", i, job.id);

                    run_job(&orchestrator, job, &cancellation_token).await;

                    active.fetch_sub(1, Ordering::SeqCst);
                }

                debug!("Worker {} shutting down", i);
            });
        }
    }

    /// Queue a job without waiting. Fails when the queue is full or the pool is stopped.
    pub fn enqueue(&self, job: Job) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(Error::ShuttingDown);
        }

        // Counted before sending so a fast worker never decrements first.
        self.queued.fetch_add(1, Ordering::SeqCst);
        match self.sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.queued.fetch_sub(1, Ordering::SeqCst);
                Err(Error::QueueFull {
                    capacity: self.config.queue_capacity,
                })
            }
            Err(TrySendError::Closed(_)) => {
                self.queued.fetch_sub(1, Ordering::SeqCst);
                Err(Error::ShuttingDown)
            }
        }
    }

    /// Stop the workers. Running jobs are interrupted; queued jobs are dropped.
    pub async fn stop(&self) {
        info!("Stopping worker pool");
        self.cancellation_token.cancel();

        let join_set = {
            let mut tasks = self.tasks.lock();
            tasks.take()
        };

        if let Some(mut join_set) = join_set {
            while join_set.join_next().await.is_some() {}
        }

        // Close the queue and discard whatever never reached a worker.
        let mut receiver = self.receiver.lock().await;
        receiver.close();
        let mut dropped = 0usize;
        while receiver.try_recv().is_ok() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            dropped += 1;
        }
        if dropped > 0 {
            warn!("Dropped {} queued jobs on shutdown", dropped);
        }

        info!("Worker pool stopped");
    }

    pub fn queued_count(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        !self.cancellation_token.is_cancelled()
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }
}

/// Run one job in its own task and turn a panic or shutdown into a log line.
async fn run_job(
    orchestrator: &Arc<PipelineOrchestrator>,
    job: Job,
    cancellation_token: &CancellationToken,
) {
    let span = info_span!(
        "job",
        job_id = %job.id,
        url = %job.url,
        media_id = tracing::field::Empty
    );
    let job_id = job.id.clone();
    let url = job.url.clone();
    let sink = orchestrator.sink().clone();

    let orchestrator = orchestrator.clone();
    let mut handle = tokio::spawn(async move { orchestrator.run(job).await }.instrument(span));

    tokio::select! {
        result = &mut handle => match result {
            Ok(report) => debug!(
                job_id = %job_id,
                state = %report.state,
                "Job finished"
            ),
            Err(e) if e.is_panic() => {
                error!(job_id = %job_id, "Job panicked: {}", e);
                sink.error(format!("Processing failed: {} (internal error)", url));
            }
            Err(e) => warn!(job_id = %job_id, "Job task ended unexpectedly: {}", e),
        },
        _ = cancellation_token.cancelled() => {
            handle.abort();
            warn!(job_id = %job_id, "Job interrupted by shutdown");
            sink.warn(format!("Processing interrupted by shutdown: {}", url));
        }
    }
}
