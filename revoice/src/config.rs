//! Runtime configuration for the worker and the relay.
//!
//! Values come from environment variables (optionally loaded from a `.env`
//! file by the binaries). Every setting has a default matching the container
//! layout the services are normally deployed with.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Speech-to-text preset. CPU execution with a fixed accuracy/speed trade-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionConfig {
    pub base_url: String,
    pub model: String,
    pub device: String,
    pub compute_type: String,
    pub beam_size: u32,
    pub language: Option<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://whisper:8000".to_string(),
            model: "base".to_string(),
            device: "cpu".to_string(),
            compute_type: "int8".to_string(),
            beam_size: 5,
            language: None,
        }
    }
}

/// Worker configuration: where artifacts go and how collaborators are reached.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory for downloaded audio, transcripts and synthesized audio.
    pub output_dir: PathBuf,
    /// Directory for the rolling diagnostic log files.
    pub log_dir: PathBuf,
    /// Number of jobs that may run at the same time.
    pub worker_count: usize,
    /// Number of accepted jobs that may wait for a free worker.
    pub queue_capacity: usize,
    pub ytdlp_path: String,
    pub transcription: TranscriptionConfig,
    pub rewriter_url: String,
    pub voicevox_url: String,
    pub voicevox_speaker: u32,
    pub storage_url: String,
    /// Timeout for a single collaborator HTTP call.
    pub http_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("temp"),
            log_dir: PathBuf::from("logs"),
            worker_count: 2,
            queue_capacity: 16,
            ytdlp_path: "yt-dlp".to_string(),
            transcription: TranscriptionConfig::default(),
            rewriter_url: "http://rewriter:5000".to_string(),
            voicevox_url: "http://voicevox:50021".to_string(),
            voicevox_speaker: 1,
            storage_url: "http://storage:5001".to_string(),
            http_timeout: Duration::from_secs(300),
        }
    }
}

impl WorkerConfig {
    /// Load from the process environment, falling back to defaults.
    ///
    /// Supported env vars: `OUTPUT_DIR`, `LOG_DIR`, `WORKER_COUNT`,
    /// `QUEUE_CAPACITY`, `YTDLP_PATH`, `WHISPER_URL`, `WHISPER_MODEL`,
    /// `WHISPER_LANGUAGE`, `REWRITER_URL`, `VOICEVOX_URL`, `VOICEVOX_SPEAKER`,
    /// `STORAGE_URL`, `HTTP_TIMEOUT_SECS`.
    pub fn from_env_or_default() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(count) = parse_value::<usize>("WORKER_COUNT", get("WORKER_COUNT"))? {
            config.worker_count = require_positive("WORKER_COUNT", count)?;
        }
        if let Some(capacity) = parse_value::<usize>("QUEUE_CAPACITY", get("QUEUE_CAPACITY"))? {
            config.queue_capacity = require_positive("QUEUE_CAPACITY", capacity)?;
        }
        if let Some(path) = get("YTDLP_PATH") {
            config.ytdlp_path = path;
        }
        if let Some(url) = get("WHISPER_URL") {
            config.transcription.base_url = url;
        }
        if let Some(model) = get("WHISPER_MODEL") {
            config.transcription.model = model;
        }
        config.transcription.language = get("WHISPER_LANGUAGE");
        if let Some(url) = get("REWRITER_URL") {
            config.rewriter_url = url;
        }
        if let Some(url) = get("VOICEVOX_URL") {
            config.voicevox_url = url;
        }
        if let Some(speaker) = parse_value::<u32>("VOICEVOX_SPEAKER", get("VOICEVOX_SPEAKER"))? {
            config.voicevox_speaker = speaker;
        }
        if let Some(url) = get("STORAGE_URL") {
            config.storage_url = url;
        }
        if let Some(secs) = parse_value::<u64>("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"))? {
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Relay (front end) configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_address: String,
    pub port: u16,
    /// Base URL of the worker API.
    pub worker_url: String,
    /// Timeout for relayed log polls.
    pub log_timeout: Duration,
    /// Timeout for relayed submissions.
    pub submit_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            worker_url: "http://worker:5000".to_string(),
            log_timeout: Duration::from_millis(2000),
            submit_timeout: Duration::from_secs(10),
        }
    }
}

impl RelayConfig {
    /// Supported env vars: `RELAY_BIND_ADDRESS`, `RELAY_PORT`, `WORKER_URL`,
    /// `LOG_RELAY_TIMEOUT_MS`.
    pub fn from_env_or_default() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind_address) = get("RELAY_BIND_ADDRESS") {
            config.bind_address = bind_address;
        }
        if let Some(port) = parse_value::<u16>("RELAY_PORT", get("RELAY_PORT"))? {
            config.port = port;
        }
        if let Some(url) = get("WORKER_URL") {
            url::Url::parse(&url)
                .map_err(|e| Error::config(format!("WORKER_URL is not a valid URL: {}", e)))?;
            config.worker_url = url;
        }
        if let Some(ms) = parse_value::<u64>("LOG_RELAY_TIMEOUT_MS", get("LOG_RELAY_TIMEOUT_MS"))? {
            config.log_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

pub(crate) fn parse_value<T>(key: &str, raw: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| Error::config(format!("{} has invalid value '{}': {}", key, value, e)))
    })
    .transpose()
}

fn require_positive(key: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(Error::config(format!("{} must be at least 1", key)));
    }
    Ok(value)
}
