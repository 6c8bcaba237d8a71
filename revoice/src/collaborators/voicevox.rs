//! VOICEVOX engine binding.
//!
//! Synthesis is a two-step exchange: `POST /audio_query` builds the synthesis
//! parameters for a text and speaker, then `POST /synthesis` renders that
//! query to a WAV file.

use async_trait::async_trait;

use super::{SpeechSynthesizer, describe_failure};
use crate::utils::http_client::endpoint;
use crate::{Error, Result};

pub struct VoicevoxClient {
    client: reqwest::Client,
    base_url: String,
    speaker: u32,
}

impl VoicevoxClient {
    pub fn new(client: reqwest::Client, base_url: &str, speaker: u32) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            speaker,
        }
    }

    async fn audio_query(&self, text: &str) -> Result<serde_json::Value> {
        let speaker = self.speaker.to_string();
        let response = self
            .client
            .post(endpoint(&self.base_url, "/audio_query"))
            .query(&[("text", text), ("speaker", speaker.as_str())])
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("audio_query: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Synthesis(format!(
                "audio_query: {}",
                describe_failure(response).await
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Synthesis(format!("audio_query: unreadable response: {}", e)))
    }
}

#[async_trait]
impl SpeechSynthesizer for VoicevoxClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let query = self.audio_query(text).await?;

        let speaker = self.speaker.to_string();
        let response = self
            .client
            .post(endpoint(&self.base_url, "/synthesis"))
            .query(&[("speaker", speaker.as_str())])
            .json(&query)
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("synthesis: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Synthesis(format!(
                "synthesis: {}",
                describe_failure(response).await
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(format!("synthesis: {}", e)))?;
        if audio.is_empty() {
            return Err(Error::Synthesis("synthesis: empty audio".to_string()));
        }
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Query,
        http::StatusCode,
        routing::post,
    };
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_two_step_synthesis() {
        let router = Router::new()
            .route(
                "/audio_query",
                post(|Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(params.get("speaker").map(String::as_str), Some("3"));
                    Json(json!({ "text_echo": params.get("text"), "speedScale": 1.0 }))
                }),
            )
            .route(
                "/synthesis",
                post(
                    |Query(params): Query<HashMap<String, String>>, Json(query): Json<Value>| async move {
                        assert_eq!(params.get("speaker").map(String::as_str), Some("3"));
                        assert_eq!(query["text_echo"], "こんにちは");
                        b"RIFF-fake-wav".to_vec()
                    },
                ),
            );
        let client = VoicevoxClient::new(reqwest::Client::new(), &serve(router).await, 3);

        let audio = client.synthesize("こんにちは").await.unwrap();
        assert_eq!(audio, b"RIFF-fake-wav");
    }

    #[tokio::test]
    async fn test_audio_query_failure() {
        let router = Router::new().route(
            "/audio_query",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": "invalid speaker" })),
                )
            }),
        );
        let client = VoicevoxClient::new(reqwest::Client::new(), &serve(router).await, 999);

        let err = client.synthesize("text").await.unwrap_err();
        assert!(
            matches!(err, Error::Synthesis(ref m) if m.starts_with("audio_query") && m.contains("invalid speaker"))
        );
    }

    #[tokio::test]
    async fn test_synthesis_failure() {
        let router = Router::new()
            .route("/audio_query", post(|| async { Json(json!({})) }))
            .route(
                "/synthesis",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "engine crashed") }),
            );
        let client = VoicevoxClient::new(reqwest::Client::new(), &serve(router).await, 1);

        let err = client.synthesize("text").await.unwrap_err();
        assert!(
            matches!(err, Error::Synthesis(ref m) if m.starts_with("synthesis") && m.contains("engine crashed"))
        );
    }
}
