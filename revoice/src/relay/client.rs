use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::api::models::LogsResponse;
use crate::utils::http_client::endpoint;
use crate::{Error, Result};

/// HTTP client for the worker API.
#[derive(Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    worker_url: String,
    log_timeout: Duration,
}

impl RelayClient {
    pub fn new(client: reqwest::Client, worker_url: &str, log_timeout: Duration) -> Self {
        Self {
            client,
            worker_url: worker_url.to_string(),
            log_timeout,
        }
    }

    /// Forward a submission. The worker's status and JSON body are passed through.
    pub async fn submit(&self, url: &str) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(endpoint(&self.worker_url, "/process"))
            .json(&json!({ "url": url }))
            .send()
            .await?;

        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or_else(|e| {
            json!({
                "status": "error",
                "message": format!("Unreadable worker response: {}", e),
            })
        });
        Ok((status, body))
    }

    /// Fetch the worker's log lines within the short relay timeout.
    pub async fn fetch_logs(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(endpoint(&self.worker_url, "/logs"))
            .timeout(self.log_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::ApiError(format!(
                "worker answered {}",
                response.status()
            )));
        }

        let body: LogsResponse = response.json().await?;
        Ok(body.logs)
    }
}
