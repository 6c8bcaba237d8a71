//! In-memory collaborators for pipeline tests.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use parking_lot::Mutex;

use crate::collaborators::{
    ArtifactStore, Collaborators, MediaDownloader, MediaInfo, Segment, SpeechSynthesizer,
    SpeechToText, TextCorrector, UploadReceipt,
};
use crate::{Error, Result};

/// How the fake corrector answers.
#[derive(Debug, Clone)]
pub enum FakeCorrection {
    /// Upper-cases ASCII and keeps line structure.
    Uppercase,
    /// Answers without any text.
    Empty,
    Fail,
}

/// Configurable fake collaborators. Clones share the upload record.
#[derive(Debug, Clone)]
pub struct FakeCollaborators {
    pub title: Option<String>,
    pub probe_error: Option<String>,
    pub panic_on_probe: bool,
    pub download_delay: Duration,
    pub segments: Vec<Segment>,
    pub transcribe_error: Option<String>,
    pub correction: FakeCorrection,
    /// Lines containing any of these substrings fail to synthesize.
    pub failing_lines: Vec<String>,
    pub sample_rate: u32,
    pub upload_error: bool,
    pub uploads: Arc<Mutex<Vec<PathBuf>>>,
}

impl Default for FakeCollaborators {
    fn default() -> Self {
        Self {
            title: Some("Test Video".to_string()),
            probe_error: None,
            panic_on_probe: false,
            download_delay: Duration::ZERO,
            segments: vec![
                segment(0.0, 1.0, "hello there"),
                segment(1.0, 2.5, "second line"),
            ],
            transcribe_error: None,
            correction: FakeCorrection::Uppercase,
            failing_lines: Vec::new(),
            sample_rate: 1000,
            upload_error: false,
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeCollaborators {
    pub fn into_collaborators(self) -> Collaborators {
        let fakes = Arc::new(self);
        Collaborators {
            downloader: Arc::new(FakeDownloader(fakes.clone())),
            transcriber: Arc::new(FakeTranscriber(fakes.clone())),
            corrector: Arc::new(FakeCorrector(fakes.clone())),
            synthesizer: Arc::new(FakeSynthesizer(fakes.clone())),
            store: Arc::new(FakeStore(fakes)),
        }
    }

    pub fn uploaded(&self) -> Vec<PathBuf> {
        self.uploads.lock().clone()
    }
}

pub fn segment(start: f64, end: f64, text: &str) -> Segment {
    Segment {
        start,
        end,
        text: text.to_string(),
    }
}

/// Mono 16-bit WAV holding `samples`.
pub fn wav_bytes(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

/// Poll `condition` until it holds or `timeout` passes.
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

struct FakeDownloader(Arc<FakeCollaborators>);

#[async_trait]
impl MediaDownloader for FakeDownloader {
    async fn probe(&self, url: &str) -> Result<MediaInfo> {
        if self.0.panic_on_probe {
            panic!("probe exploded for {}", url);
        }
        if let Some(message) = &self.0.probe_error {
            return Err(Error::Download(message.clone()));
        }
        Ok(MediaInfo {
            id: Some("abc123".to_string()),
            title: self.0.title.clone(),
        })
    }

    async fn download_audio(&self, _url: &str, output_dir: &Path, stem: &str) -> Result<PathBuf> {
        tokio::time::sleep(self.0.download_delay).await;
        let path = output_dir.join(format!("{}.mp3", stem));
        tokio::fs::write(&path, b"FAKE-MP3").await?;
        Ok(path)
    }
}

struct FakeTranscriber(Arc<FakeCollaborators>);

#[async_trait]
impl SpeechToText for FakeTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<Vec<Segment>> {
        match &self.0.transcribe_error {
            Some(message) => Err(Error::Transcription(message.clone())),
            None => Ok(self.0.segments.clone()),
        }
    }
}

struct FakeCorrector(Arc<FakeCollaborators>);

#[async_trait]
impl TextCorrector for FakeCorrector {
    async fn correct(&self, text: &str) -> Result<Option<String>> {
        match self.0.correction {
            FakeCorrection::Uppercase => Ok(Some(text.to_ascii_uppercase())),
            FakeCorrection::Empty => Ok(None),
            FakeCorrection::Fail => Err(Error::Correction("service unavailable".to_string())),
        }
    }
}

struct FakeSynthesizer(Arc<FakeCollaborators>);

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        if self.0.failing_lines.iter().any(|f| text.contains(f.as_str())) {
            return Err(Error::Synthesis(format!("cannot voice '{}'", text)));
        }
        Ok(wav_bytes(self.0.sample_rate, &[100, 200, 300]))
    }
}

struct FakeStore(Arc<FakeCollaborators>);

#[async_trait]
impl ArtifactStore for FakeStore {
    async fn upload(&self, path: &Path) -> Result<UploadReceipt> {
        if self.0.upload_error {
            return Err(Error::Storage("storage offline".to_string()));
        }
        let mut uploads = self.0.uploads.lock();
        uploads.push(path.to_path_buf());
        Ok(UploadReceipt {
            file_id: format!("file-{}", uploads.len()),
        })
    }
}
