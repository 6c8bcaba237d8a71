use std::path::{Path, PathBuf};

use tracing::Span;

use crate::Result;
use crate::collaborators::MediaDownloader;
use crate::logging::LogSink;
use crate::utils::filename::sanitize_optional_title;
use crate::utils::fs;

/// Downloaded audio plus the base name shared by every artifact of the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredMedia {
    pub title: String,
    /// Source-side identifier, when the downloader reports one.
    pub media_id: Option<String>,
    pub audio_path: PathBuf,
}

/// Resolve the title, then download and transcode the audio track.
pub async fn acquire_media(
    downloader: &dyn MediaDownloader,
    sink: &LogSink,
    url: &str,
    output_dir: &Path,
) -> Result<AcquiredMedia> {
    fs::ensure_dir_all_with_op("creating output directory", output_dir).await?;

    sink.info("Fetching video information...");
    let info = downloader.probe(url).await?;
    let title = sanitize_optional_title(info.title.as_deref());
    sink.info(format!("Title: {}", title));
    if let Some(id) = &info.id {
        Span::current().record("media_id", id.as_str());
    }

    sink.info("Downloading audio...");
    let audio_path = downloader.download_audio(url, output_dir, &title).await?;
    sink.info(format!("Download complete: {}", audio_path.display()));

    Ok(AcquiredMedia {
        title,
        media_id: info.id,
        audio_path,
    })
}
