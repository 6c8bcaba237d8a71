//! Bounded, shared job progress log.
//!
//! Pipeline stages report progress here and the `/logs` endpoint returns a
//! snapshot. The sink keeps only the newest [`LOG_CAPACITY`] entries; append
//! and eviction happen under the same lock so readers never observe more than
//! the capacity or a half-applied update.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;

/// Maximum number of entries retained by the sink.
pub const LOG_CAPACITY: usize = 100;

/// Severity of a job log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// A single immutable log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Fixed-capacity FIFO of [`LogEntry`] values safe to share between tasks.
#[derive(Debug)]
pub struct LogSink {
    entries: Mutex<VecDeque<LogEntry>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(LOG_CAPACITY)),
        }
    }

    /// Append an info entry timestamped now.
    pub fn append(&self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    fn push(&self, level: LogLevel, message: String) {
        // Mirror into tracing so the file log keeps what the sink evicts.
        match level {
            LogLevel::Info => tracing::info!(target: "revoice::job", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "revoice::job", "{}", message),
            LogLevel::Error => tracing::error!(target: "revoice::job", "{}", message),
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            level,
            message,
        };

        let mut entries = self.entries.lock();
        while entries.len() >= LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Copy of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Current entries rendered as `[HH:MM:SS] message`, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}
