//! `yt-dlp` binding for metadata lookup and audio download.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use super::{MediaDownloader, MediaInfo};
use crate::utils::process::run_command_with_logs;
use crate::{Error, Result};

/// Target codec for extracted audio.
const AUDIO_FORMAT: &str = "mp3";
/// Target bitrate for extracted audio.
const AUDIO_QUALITY: &str = "192K";

#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: Option<String>,
    title: Option<String>,
}

/// Runs the `yt-dlp` command-line tool (which in turn drives ffmpeg).
pub struct YtDlpDownloader {
    ytdlp_path: String,
}

impl YtDlpDownloader {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }

    /// Arguments for the metadata-only probe.
    pub fn probe_args(url: &str) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            url.to_string(),
        ]
    }

    /// Arguments for downloading best audio and transcoding to MP3.
    pub fn download_args(url: &str, output_dir: &Path, stem: &str) -> Vec<String> {
        let template = output_dir.join(format!("{}.%(ext)s", stem));
        vec![
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            AUDIO_FORMAT.to_string(),
            "--audio-quality".to_string(),
            AUDIO_QUALITY.to_string(),
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "--force-overwrites".to_string(),
            "--output".to_string(),
            template.to_string_lossy().to_string(),
            url.to_string(),
        ]
    }

    fn parse_info(stdout: &str) -> Result<MediaInfo> {
        let info: YtDlpInfo = serde_json::from_str(stdout.trim())
            .map_err(|e| Error::Download(format!("unreadable metadata from yt-dlp: {}", e)))?;
        Ok(MediaInfo {
            id: info.id,
            title: info.title,
        })
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    async fn probe(&self, url: &str) -> Result<MediaInfo> {
        let mut cmd = Command::new(&self.ytdlp_path);
        cmd.args(Self::probe_args(url)).env("LC_ALL", "C");

        let output = run_command_with_logs(&mut cmd)
            .await
            .map_err(|e| Error::Download(format!("could not run {}: {}", self.ytdlp_path, e)))?;

        if !output.status.success() {
            return Err(Error::Download(output.error_summary()));
        }

        Self::parse_info(&output.stdout_text())
    }

    async fn download_audio(&self, url: &str, output_dir: &Path, stem: &str) -> Result<PathBuf> {
        let args = Self::download_args(url, output_dir, stem);
        debug!("yt-dlp args: {:?}", args);

        let mut cmd = Command::new(&self.ytdlp_path);
        cmd.args(&args).env("LC_ALL", "C");

        let output = run_command_with_logs(&mut cmd)
            .await
            .map_err(|e| Error::Download(format!("could not run {}: {}", self.ytdlp_path, e)))?;

        if !output.status.success() {
            return Err(Error::Download(output.error_summary()));
        }

        let audio_path = output_dir.join(format!("{}.{}", stem, AUDIO_FORMAT));
        if !tokio::fs::try_exists(&audio_path).await.unwrap_or(false) {
            return Err(Error::Download(format!(
                "yt-dlp finished but {} was not created",
                audio_path.display()
            )));
        }

        info!(
            "Audio download completed in {:.2}s: {}",
            output.duration,
            audio_path.display()
        );
        Ok(audio_path)
    }
}
