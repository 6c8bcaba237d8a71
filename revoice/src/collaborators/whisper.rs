//! Whisper-compatible transcription server binding.
//!
//! Speaks the OpenAI-style `/v1/audio/transcriptions` endpoint exposed by
//! faster-whisper and whisper.cpp servers, asking for `verbose_json` so the
//! response carries timed segments.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use super::{Segment, SpeechToText, describe_failure};
use crate::config::TranscriptionConfig;
use crate::utils::http_client::endpoint;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    segments: Vec<Segment>,
}

pub struct WhisperClient {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

impl WhisperClient {
    pub fn new(client: reqwest::Client, config: TranscriptionConfig) -> Self {
        Self { client, config }
    }

    fn form(&self, file_name: String, audio: Vec<u8>) -> Result<Form> {
        let part = Part::bytes(audio)
            .file_name(file_name)
            .mime_str("audio/mpeg")?;

        let mut form = Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("device", self.config.device.clone())
            .text("compute_type", self.config.compute_type.clone())
            .text("beam_size", self.config.beam_size.to_string());

        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }
        Ok(form)
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>> {
        let audio = tokio::fs::read(audio_path)
            .await
            .map_err(|e| Error::io_path("reading", audio_path, e))?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());

        debug!(
            model = %self.config.model,
            bytes = audio.len(),
            "Sending audio for transcription"
        );

        let response = self
            .client
            .post(endpoint(&self.config.base_url, "/v1/audio/transcriptions"))
            .multipart(self.form(file_name, audio)?)
            .send()
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Transcription(describe_failure(response).await));
        }

        let body: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("unreadable response: {}", e)))?;

        Ok(body.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, body::Bytes, http::StatusCode, routing::post};
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config(base_url: String) -> TranscriptionConfig {
        TranscriptionConfig {
            base_url,
            language: Some("ja".to_string()),
            ..TranscriptionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_transcribe_returns_segments() {
        let router = Router::new().route(
            "/v1/audio/transcriptions",
            post(|body: Bytes| async move {
                let body = String::from_utf8_lossy(&body).to_string();
                assert!(body.contains("verbose_json"));
                assert!(body.contains("FAKE-MP3"));
                assert!(body.contains("name=\"beam_size\""));
                Json(serde_json::json!({
                    "text": "こんにちは 世界",
                    "segments": [
                        {"id": 0, "start": 0.0, "end": 1.5, "text": "こんにちは"},
                        {"id": 1, "start": 1.5, "end": 3.0, "text": "世界"}
                    ]
                }))
            }),
        );
        let base = serve(router).await;

        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.mp3");
        std::fs::write(&audio, b"FAKE-MP3").unwrap();

        let client = WhisperClient::new(reqwest::Client::new(), config(base));
        let segments = client.transcribe(&audio).await.unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, "世界");
        assert_eq!(segments[1].start, 1.5);
    }

    #[tokio::test]
    async fn test_server_error_is_transcription_error() {
        let router = Router::new().route(
            "/v1/audio/transcriptions",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"detail": "model not loaded"})),
                )
            }),
        );
        let base = serve(router).await;

        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.mp3");
        std::fs::write(&audio, b"x").unwrap();

        let client = WhisperClient::new(reqwest::Client::new(), config(base));
        let err = client.transcribe(&audio).await.unwrap_err();

        assert!(matches!(err, Error::Transcription(ref m) if m.contains("model not loaded")));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let client = WhisperClient::new(
            reqwest::Client::new(),
            config("http://127.0.0.1:9".to_string()),
        );
        let err = client
            .transcribe(Path::new("/nonexistent/clip.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IoPath { op: "reading", .. }));
    }
}
