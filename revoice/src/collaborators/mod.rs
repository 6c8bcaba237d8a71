//! External services the pipeline calls into.
//!
//! Each collaborator sits behind a narrow trait so the pipeline only depends
//! on the request/response contract. Production bindings talk to `yt-dlp`,
//! a Whisper-compatible transcription server, the rewriter service, VOICEVOX,
//! and the storage uploader.

mod rewriter;
mod storage;
mod voicevox;
mod whisper;
mod ytdlp;

pub use rewriter::RewriterClient;
pub use storage::StorageClient;
pub use voicevox::VoicevoxClient;
pub use whisper::WhisperClient;
pub use ytdlp::YtDlpDownloader;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::config::WorkerConfig;
use crate::utils::http_client::build_http_client;

/// Metadata resolved for a source URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub id: Option<String>,
    pub title: Option<String>,
}

/// One timed piece of a transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Receipt returned by the storage service for a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_id: String,
}

/// Downloads media and extracts its audio track.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Resolve metadata (including the title) without downloading.
    async fn probe(&self, url: &str) -> Result<MediaInfo>;

    /// Download the best available audio and transcode it to MP3.
    ///
    /// The file is written to `{output_dir}/{stem}.mp3`; the returned path points at it.
    async fn download_audio(&self, url: &str, output_dir: &Path, stem: &str) -> Result<PathBuf>;
}

/// Turns a local audio file into timed text segments.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>>;
}

/// Rewrites a raw transcript into natural text.
#[async_trait]
pub trait TextCorrector: Send + Sync {
    /// Returns `Ok(None)` when the service answered without any text.
    async fn correct(&self, text: &str) -> Result<Option<String>>;
}

/// Renders one line of text to WAV audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Uploads a local artifact to durable storage.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadReceipt>;
}

/// The full set of collaborators a pipeline run needs.
#[derive(Clone)]
pub struct Collaborators {
    pub downloader: Arc<dyn MediaDownloader>,
    pub transcriber: Arc<dyn SpeechToText>,
    pub corrector: Arc<dyn TextCorrector>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub store: Arc<dyn ArtifactStore>,
}

impl Collaborators {
    /// Production bindings built from the worker configuration.
    pub fn from_config(config: &WorkerConfig) -> Self {
        let client = build_http_client(config.http_timeout);

        Self {
            downloader: Arc::new(YtDlpDownloader::new(config.ytdlp_path.clone())),
            transcriber: Arc::new(WhisperClient::new(
                client.clone(),
                config.transcription.clone(),
            )),
            corrector: Arc::new(RewriterClient::new(client.clone(), &config.rewriter_url)),
            synthesizer: Arc::new(VoicevoxClient::new(
                client.clone(),
                &config.voicevox_url,
                config.voicevox_speaker,
            )),
            store: Arc::new(StorageClient::new(client, &config.storage_url)),
        }
    }
}

/// Extract a short error message from a JSON error body, if there is one.
pub(crate) fn error_message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .find_map(|key| value.get(*key))
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

/// Describe a failed HTTP response as `"<status>: <message>"`.
pub(crate) async fn describe_failure(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message_from_body(&body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "no response body".to_string()
        } else {
            trimmed.chars().take(200).collect()
        }
    });
    format!("{}: {}", status, message)
}
