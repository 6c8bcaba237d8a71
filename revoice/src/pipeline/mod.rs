//! Job pipeline: acquisition, transcription, correction, synthesis and upload.
//!
//! The [`JobDispatcher`] validates submissions and queues them on the
//! [`WorkerPool`]; each worker drives one job at a time through the
//! [`PipelineOrchestrator`]. Progress and failures are reported only through
//! the shared [`LogSink`](crate::logging::LogSink).

mod dispatcher;
mod job;
mod orchestrator;
pub mod stages;
mod worker_pool;

#[cfg(test)]
pub(crate) mod test_utils;

pub use dispatcher::{JobDispatcher, JobTicket};
pub use job::{Job, JobArtifacts, JobReport, JobState};
pub use orchestrator::{ArtifactPaths, PipelineOrchestrator};
pub use worker_pool::{WorkerPool, WorkerPoolConfig};
