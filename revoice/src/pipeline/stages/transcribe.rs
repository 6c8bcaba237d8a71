use std::path::Path;

use crate::collaborators::{Segment, SpeechToText};
use crate::logging::LogSink;
use crate::{Error, Result};

/// Number of characters of each segment shown in the progress log.
pub const PREVIEW_CHARS: usize = 40;

/// First [`PREVIEW_CHARS`] characters of `text`, with `...` if cut.
pub fn preview(text: &str) -> String {
    let text = text.trim();
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Concatenate segment texts, each followed by a line break.
pub fn join_segments(segments: &[Segment]) -> String {
    segments.iter().fold(String::new(), |mut acc, segment| {
        acc.push_str(&segment.text);
        acc.push('\n');
        acc
    })
}

/// Transcribe the downloaded audio into a raw transcript.
pub async fn transcribe(
    transcriber: &dyn SpeechToText,
    sink: &LogSink,
    audio_path: &Path,
) -> Result<String> {
    sink.info("Transcribing audio (this may take a while)...");
    let segments = transcriber.transcribe(audio_path).await?;

    for segment in &segments {
        sink.info(format!(
            "[{:.2}s -> {:.2}s] {}",
            segment.start,
            segment.end,
            preview(&segment.text)
        ));
    }

    let transcript = join_segments(&segments);
    if transcript.trim().is_empty() {
        return Err(Error::Transcription("no speech was recognized".to_string()));
    }

    sink.info(format!(
        "Transcription complete: {} segments, {} characters",
        segments.len(),
        transcript.chars().count()
    ));
    Ok(transcript)
}
