//! Request and response bodies.

use serde::{Deserialize, Serialize};

/// `POST /process` body. `url` may be missing; that is reported as a 400.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// 202 acknowledgment for an accepted job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedResponse {
    /// Always `"accepted"`.
    pub status: String,
    pub message: String,
    pub job_id: String,
}

/// `GET /logs` body: formatted lines, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub queued_jobs: usize,
    pub active_jobs: usize,
}

/// Current tracing filter directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFilterBody {
    pub filter: String,
}
