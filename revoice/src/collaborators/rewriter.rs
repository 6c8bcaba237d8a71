//! Client for the transcript rewriting service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{TextCorrector, describe_failure};
use crate::utils::http_client::endpoint;
use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct RewriteRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct RewriteResponse {
    rewritten_text: Option<String>,
}

/// `POST /rewrite {text}` -> `{rewritten_text}`.
pub struct RewriterClient {
    client: reqwest::Client,
    url: String,
}

impl RewriterClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: endpoint(base_url, "/rewrite"),
        }
    }
}

#[async_trait]
impl TextCorrector for RewriterClient {
    async fn correct(&self, text: &str) -> Result<Option<String>> {
        let response = self
            .client
            .post(&self.url)
            .json(&RewriteRequest { text })
            .send()
            .await
            .map_err(|e| Error::Correction(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Correction(describe_failure(response).await));
        }

        let body: RewriteResponse = response
            .json()
            .await
            .map_err(|e| Error::Correction(format!("unreadable response: {}", e)))?;

        Ok(body.rewritten_text.filter(|t| !t.trim().is_empty()))
    }
}
