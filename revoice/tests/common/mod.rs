//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use revoice::collaborators::{
    ArtifactStore, Collaborators, MediaDownloader, MediaInfo, Segment, SpeechSynthesizer,
    SpeechToText, TextCorrector, UploadReceipt,
};
use revoice::{Error, Result};

/// One fake standing in for every external service.
///
/// The title is taken from the URL's last path segment so concurrent jobs
/// write to distinct files.
#[derive(Default)]
pub struct FakeServices {
    pub fail_download: bool,
    pub fail_correction: bool,
    pub fail_all_synthesis: bool,
    pub download_delay: Duration,
    pub uploads: Mutex<Vec<PathBuf>>,
}

impl FakeServices {
    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators {
            downloader: self.clone(),
            transcriber: self.clone(),
            corrector: self.clone(),
            synthesizer: self.clone(),
            store: self.clone(),
        }
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploads
            .lock()
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect()
    }
}

#[async_trait]
impl MediaDownloader for FakeServices {
    async fn probe(&self, url: &str) -> Result<MediaInfo> {
        if self.fail_download {
            return Err(Error::Download("HTTP Error 404: Not Found".to_string()));
        }
        Ok(MediaInfo {
            id: None,
            title: url.rsplit('/').next().map(str::to_string),
        })
    }

    async fn download_audio(&self, _url: &str, output_dir: &Path, stem: &str) -> Result<PathBuf> {
        tokio::time::sleep(self.download_delay).await;
        let path = output_dir.join(format!("{}.mp3", stem));
        tokio::fs::write(&path, b"mp3").await?;
        Ok(path)
    }
}

#[async_trait]
impl SpeechToText for FakeServices {
    async fn transcribe(&self, _audio_path: &Path) -> Result<Vec<Segment>> {
        Ok(vec![
            Segment {
                start: 0.0,
                end: 1.2,
                text: "えーと今日は".to_string(),
            },
            Segment {
                start: 1.2,
                end: 2.0,
                text: "いい天気".to_string(),
            },
        ])
    }
}

#[async_trait]
impl TextCorrector for FakeServices {
    async fn correct(&self, text: &str) -> Result<Option<String>> {
        if self.fail_correction {
            return Err(Error::Correction("500 Internal Server Error".to_string()));
        }
        Ok(Some(text.replace("えーと", "")))
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeServices {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        if self.fail_all_synthesis {
            return Err(Error::Synthesis("engine offline".to_string()));
        }
        Ok(wav(&[1, 2, 3, 4]))
    }
}

#[async_trait]
impl ArtifactStore for FakeServices {
    async fn upload(&self, path: &Path) -> Result<UploadReceipt> {
        let mut uploads = self.uploads.lock();
        uploads.push(path.to_path_buf());
        Ok(UploadReceipt {
            file_id: format!("id-{}", uploads.len()),
        })
    }
}

fn wav(samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

/// Poll `condition` every 10 ms until it holds or `timeout` passes.
pub async fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
