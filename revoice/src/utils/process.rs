//! Child-process helper used by the command-line collaborators.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{Error, Result};

/// Output from a command execution, captured line by line.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub duration: f64,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandOutput {
    /// Whole stdout joined back together.
    pub fn stdout_text(&self) -> String {
        self.stdout.join("\n")
    }

    /// Last stderr line that mentions an error, or the last stderr line at all.
    pub fn error_summary(&self) -> String {
        self.stderr
            .iter()
            .rfind(|l| l.to_lowercase().contains("error"))
            .or_else(|| self.stderr.last())
            .cloned()
            .unwrap_or_else(|| format!("exit code {}", self.status.code().unwrap_or(-1)))
    }
}

fn collect_lines<R>(reader: R, stream: &'static str) -> JoinHandle<Vec<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        let mut collected = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!("{}: {}", stream, line);
            collected.push(line);
        }
        collected
    })
}

/// Run a command to completion and capture stdout/stderr.
///
/// A non-zero exit status is not an error here; callers inspect `status`.
pub async fn run_command_with_logs(command: &mut Command) -> Result<CommandOutput> {
    let start = std::time::Instant::now();

    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.kill_on_drop(true);

    let mut child = command
        .spawn()
        .map_err(|e| Error::Other(format!("Failed to spawn command: {}", e)))?;

    let stdout_task = child.stdout.take().map(|s| collect_lines(s, "stdout"));
    let stderr_task = child.stderr.take().map(|s| collect_lines(s, "stderr"));

    let status = child
        .wait()
        .await
        .map_err(|e| Error::Other(format!("Failed to wait for command: {}", e)))?;

    let stdout = match stdout_task {
        Some(task) => task.await.unwrap_or_default(),
        None => Vec::new(),
    };
    let stderr = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => Vec::new(),
    };

    Ok(CommandOutput {
        status,
        duration: start.elapsed().as_secs_f64(),
        stdout,
        stderr,
    })
}
