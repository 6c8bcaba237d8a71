//! Job model and the per-job state machine.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::stages::{SynthesisReport, UploadOutcome};
use crate::{Error, Result};

/// Lifecycle of one job.
///
/// ```text
/// Received -> Downloading -> Transcribing -> Correcting -> Synthesizing -> Uploading -> Completed
///                  |               |
///                  +---> Failed <--+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JobState {
    Received,
    Downloading,
    Transcribing,
    Correcting,
    Synthesizing,
    Uploading,
    Completed,
    Failed,
}

impl JobState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Received, Downloading)
                | (Downloading, Transcribing)
                | (Downloading, Failed)
                | (Transcribing, Correcting)
                | (Transcribing, Failed)
                | (Correcting, Synthesizing)
                | (Synthesizing, Uploading)
                | (Uploading, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Received => "Received",
            JobState::Downloading => "Downloading",
            JobState::Transcribing => "Transcribing",
            JobState::Correcting => "Correcting",
            JobState::Synthesizing => "Synthesizing",
            JobState::Uploading => "Uploading",
            JobState::Completed => "Completed",
            JobState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// A submitted job. Lives only as long as its background run.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub url: String,
    pub received_at: DateTime<Utc>,
    state: JobState,
}

impl Job {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            received_at: Utc::now(),
            state: JobState::Received,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Move to `next`, rejecting moves the state machine does not allow.
    pub fn transition(&mut self, next: JobState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }
}

/// Local files produced by a job, named after the sanitized title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobArtifacts {
    pub audio: Option<PathBuf>,
    pub raw_transcript: Option<PathBuf>,
    pub corrected_transcript: Option<PathBuf>,
    pub synthesized_audio: Option<PathBuf>,
}

/// What happened to a job, for tracing and tests. Never served over HTTP.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: String,
    pub url: String,
    pub state: JobState,
    pub title: Option<String>,
    pub artifacts: JobArtifacts,
    /// Transcript handed to synthesis (corrected, or raw on fallback).
    pub final_text: Option<String>,
    pub corrected: bool,
    pub synthesis: Option<SynthesisReport>,
    pub uploads: Vec<UploadOutcome>,
    pub failure: Option<String>,
    pub elapsed_secs: f64,
}

impl JobReport {
    pub(crate) fn new(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            url: job.url.clone(),
            state: job.state(),
            title: None,
            artifacts: JobArtifacts::default(),
            final_text: None,
            corrected: false,
            synthesis: None,
            uploads: Vec::new(),
            failure: None,
            elapsed_secs: 0.0,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == JobState::Completed
    }
}
