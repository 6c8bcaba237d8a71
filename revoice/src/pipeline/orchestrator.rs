//! Runs the five stages for a single job.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use super::job::{Job, JobReport, JobState};
use super::stages::{acquire_media, correct_text, persist_artifacts, synthesize_speech, transcribe};
use crate::Error;
use crate::collaborators::Collaborators;
use crate::logging::LogSink;
use crate::utils::fs;

/// Artifact paths derived from the sanitized title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub raw_transcript: PathBuf,
    pub corrected_transcript: PathBuf,
    pub synthesized_audio: PathBuf,
}

impl ArtifactPaths {
    pub fn new(output_dir: &Path, title: &str) -> Self {
        Self {
            raw_transcript: output_dir.join(format!("{}_raw.txt", title)),
            corrected_transcript: output_dir.join(format!("{}_rewritten.txt", title)),
            synthesized_audio: output_dir.join(format!("{}_rewritten.wav", title)),
        }
    }
}

/// Sequences acquisition, transcription, correction, synthesis and upload.
///
/// Only acquisition and transcription can fail a job. Every outcome ends with
/// one summary line in the log sink.
pub struct PipelineOrchestrator {
    collaborators: Collaborators,
    sink: Arc<LogSink>,
    output_dir: PathBuf,
}

impl PipelineOrchestrator {
    pub fn new(collaborators: Collaborators, sink: Arc<LogSink>, output_dir: PathBuf) -> Self {
        Self {
            collaborators,
            sink,
            output_dir,
        }
    }

    pub fn sink(&self) -> &Arc<LogSink> {
        &self.sink
    }

    /// Run the job to a terminal state. Errors end up in the log, never here.
    pub async fn run(&self, mut job: Job) -> JobReport {
        let start = Instant::now();
        let mut report = JobReport::new(&job);

        self.sink.info(format!("Processing started: {}", job.url));

        if let Err(e) = self.run_stages(&mut job, &mut report).await {
            report.failure = Some(e.to_string());
            self.advance(&mut job, JobState::Failed);
        }

        report.state = job.state();
        report.elapsed_secs = start.elapsed().as_secs_f64();

        match report.state {
            JobState::Completed => {
                self.sink.info(format!(
                    "All processing complete: {} ({:.1}s)",
                    report.title.as_deref().unwrap_or(&job.url),
                    report.elapsed_secs
                ));
                info!(
                    job_id = %job.id,
                    elapsed_secs = report.elapsed_secs,
                    uploads = report.uploads.len(),
                    "Job completed"
                );
            }
            _ => {
                let reason = report.failure.as_deref().unwrap_or("unknown error");
                self.sink.error(format!("Processing failed: {} ({})", job.url, reason));
                error!(job_id = %job.id, error = %reason, "Job failed");
            }
        }

        report
    }

    fn advance(&self, job: &mut Job, next: JobState) {
        let from = job.state();
        match job.transition(next) {
            Ok(()) => debug!(job_id = %job.id, %from, to = %next, "Job state changed"),
            // Transitions are driven by this file only; a rejection is a bug.
            Err(e) => error!(job_id = %job.id, error = %e, "Rejected job state change"),
        }
    }

    async fn run_stages(&self, job: &mut Job, report: &mut JobReport) -> crate::Result<()> {
        let c = &self.collaborators;
        let sink = self.sink.as_ref();

        self.advance(job, JobState::Downloading);
        let media = acquire_media(c.downloader.as_ref(), sink, &job.url, &self.output_dir)
            .await
            .map_err(|e| Error::Download(strip_prefix(e)))?;
        report.title = Some(media.title.clone());
        report.artifacts.audio = Some(media.audio_path.clone());
        let paths = ArtifactPaths::new(&self.output_dir, &media.title);

        self.advance(job, JobState::Transcribing);
        let raw = transcribe(c.transcriber.as_ref(), sink, &media.audio_path)
            .await
            .map_err(|e| Error::Transcription(strip_prefix(e)))?;

        self.advance(job, JobState::Correcting);
        let correction = correct_text(c.corrector.as_ref(), sink, &raw).await;
        report.corrected = correction.corrected;

        // Textual artifacts are written before synthesis so they survive it.
        if self
            .save_text(&paths.raw_transcript, &raw, "raw transcript")
            .await
            .is_ok()
        {
            report.artifacts.raw_transcript = Some(paths.raw_transcript.clone());
        }
        let corrected_saved = self
            .save_text(
                &paths.corrected_transcript,
                &correction.text,
                "corrected transcript",
            )
            .await
            .is_ok();
        if corrected_saved {
            report.artifacts.corrected_transcript = Some(paths.corrected_transcript.clone());
        }

        self.advance(job, JobState::Synthesizing);
        let synthesis = synthesize_speech(
            c.synthesizer.as_ref(),
            sink,
            &correction.text,
            &paths.synthesized_audio,
        )
        .await;
        report.artifacts.synthesized_audio = synthesis.audio_path.clone();

        self.advance(job, JobState::Uploading);
        let mut uploads = Vec::new();
        if corrected_saved {
            uploads.push(paths.corrected_transcript.clone());
        }
        match &synthesis.audio_path {
            Some(audio) => uploads.push(audio.clone()),
            None => self.sink.warn("No synthesized audio; skipping audio upload"),
        }
        report.uploads = persist_artifacts(c.store.as_ref(), sink, &uploads).await;
        report.synthesis = Some(synthesis);
        report.final_text = Some(correction.text);

        self.advance(job, JobState::Completed);
        Ok(())
    }

    async fn save_text(&self, path: &Path, contents: &str, what: &str) -> crate::Result<()> {
        match fs::write_text(path, contents).await {
            Ok(()) => {
                self.sink.info(format!("Saved {}: {}", what, path.display()));
                Ok(())
            }
            Err(e) => {
                self.sink.error(format!("Failed to save {}: {}", what, e));
                Err(e)
            }
        }
    }
}

/// Message of a stage error without its variant prefix, so it can be re-tagged
/// with the stage that raised it.
fn strip_prefix(e: Error) -> String {
    match e {
        Error::Download(m) | Error::Transcription(m) => m,
        other => other.to_string(),
    }
}
