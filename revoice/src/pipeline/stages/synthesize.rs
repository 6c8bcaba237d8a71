use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::collaborators::SpeechSynthesizer;
use crate::logging::LogSink;
use crate::utils::fs;
use crate::{Error, Result};

/// Silence inserted after every synthesized line.
pub const SILENCE_GAP: Duration = Duration::from_millis(500);

/// Progress is logged every this many lines.
const PROGRESS_EVERY: usize = 10;

/// Outcome of one transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Synthesized { frames: u32 },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineResult {
    /// 1-based index among the non-empty lines.
    pub line_no: usize,
    pub outcome: LineOutcome,
}

/// Per-line results plus the written audio file, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    pub lines: Vec<LineResult>,
    pub audio_path: Option<PathBuf>,
}

impl SynthesisReport {
    pub fn succeeded(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l.outcome, LineOutcome::Synthesized { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.lines.len() - self.succeeded()
    }

    pub fn produced_audio(&self) -> bool {
        self.audio_path.is_some()
    }
}

/// Non-empty, trimmed lines of `text` in original order.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Running concatenation of decoded WAV segments with silence gaps.
///
/// The first accepted segment fixes the output format.
#[derive(Debug, Default)]
struct CombinedAudio {
    spec: Option<WavSpec>,
    samples: Vec<i32>,
    segments: usize,
}

impl CombinedAudio {
    /// Decode `wav` and append it followed by [`SILENCE_GAP`]. Returns the segment's frame count.
    fn push_wav(&mut self, wav: &[u8]) -> Result<u32> {
        let mut reader = WavReader::new(Cursor::new(wav))?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int {
            return Err(Error::Synthesis(
                "floating-point WAV is not supported".to_string(),
            ));
        }
        if let Some(expected) = self.spec
            && expected != spec
        {
            return Err(Error::Synthesis(format!(
                "format mismatch: expected {}Hz/{}ch/{}bit, got {}Hz/{}ch/{}bit",
                expected.sample_rate,
                expected.channels,
                expected.bits_per_sample,
                spec.sample_rate,
                spec.channels,
                spec.bits_per_sample
            )));
        }

        let samples = reader
            .samples::<i32>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if samples.is_empty() {
            return Err(Error::Synthesis("decoded audio is empty".to_string()));
        }

        let frames = (samples.len() / spec.channels as usize) as u32;
        self.spec = Some(spec);
        self.samples.extend_from_slice(&samples);
        self.samples
            .extend(std::iter::repeat_n(0, silence_samples(&spec)));
        self.segments += 1;

        Ok(frames)
    }

    fn is_empty(&self) -> bool {
        self.segments == 0
    }

    /// Encode everything collected so far as one WAV file.
    fn encode(&self) -> Result<Vec<u8>> {
        let spec = self
            .spec
            .ok_or_else(|| Error::Synthesis("no audio to encode".to_string()))?;

        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(cursor.into_inner())
    }
}

/// Number of zero samples making up one silence gap for `spec`.
fn silence_samples(spec: &WavSpec) -> usize {
    let frames = spec.sample_rate as u64 * SILENCE_GAP.as_millis() as u64 / 1000;
    frames as usize * spec.channels as usize
}

/// Synthesize each line independently and write the combined WAV to `output_path`.
///
/// A failing line is logged and left out. When no line succeeds nothing is
/// written and the report has no `audio_path`.
pub async fn synthesize_speech(
    synthesizer: &dyn SpeechSynthesizer,
    sink: &LogSink,
    text: &str,
    output_path: &Path,
) -> SynthesisReport {
    let lines = split_lines(text);
    let total = lines.len();
    let mut report = SynthesisReport::default();
    let mut combined = CombinedAudio::default();

    sink.info(format!("Synthesizing speech for {} lines...", total));

    for (idx, line) in lines.into_iter().enumerate() {
        let line_no = idx + 1;

        let outcome = match synthesizer.synthesize(line).await {
            Ok(wav) => match combined.push_wav(&wav) {
                Ok(frames) => LineOutcome::Synthesized { frames },
                Err(e) => LineOutcome::Skipped {
                    reason: format!("unusable audio: {}", e),
                },
            },
            Err(e) => LineOutcome::Skipped {
                reason: e.to_string(),
            },
        };

        if let LineOutcome::Skipped { reason } = &outcome {
            sink.warn(format!("Line {}/{} skipped: {}", line_no, total, reason));
        } else if line_no % PROGRESS_EVERY == 0 {
            sink.info(format!("Synthesized {}/{} lines", line_no, total));
        }

        report.lines.push(LineResult { line_no, outcome });
    }

    if combined.is_empty() {
        sink.error("Speech synthesis produced no audio");
        return report;
    }

    let written: Result<()> = async {
        let wav = combined.encode()?;
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::ensure_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, wav)
            .await
            .map_err(|e| fs::io_error("writing", output_path, e))
    }
    .await;

    match written {
        Ok(()) => {
            sink.info(format!(
                "Speech synthesis complete: {}/{} lines, saved to {}",
                report.succeeded(),
                total,
                output_path.display()
            ));
            report.audio_path = Some(output_path.to_path_buf());
        }
        Err(e) => sink.error(format!("Failed to save synthesized audio: {}", e)),
    }

    report
}
