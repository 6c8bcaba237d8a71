use crate::collaborators::TextCorrector;
use crate::logging::LogSink;

/// Result of the correction stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    /// Text for the following stages; equals the raw transcript on fallback.
    pub text: String,
    /// Whether the correction service actually supplied the text.
    pub corrected: bool,
}

impl Correction {
    fn fallback(raw: &str) -> Self {
        Self {
            text: raw.to_string(),
            corrected: false,
        }
    }
}

/// Ask the correction service to rewrite the transcript.
///
/// Never fails: any problem is logged and the raw transcript is returned.
pub async fn correct_text(corrector: &dyn TextCorrector, sink: &LogSink, raw: &str) -> Correction {
    if raw.trim().is_empty() {
        sink.warn("Transcript is empty; skipping correction");
        return Correction::fallback(raw);
    }

    sink.info("Correcting transcript with AI...");
    match corrector.correct(raw).await {
        Ok(Some(text)) => {
            sink.info(format!(
                "Correction complete: {} characters",
                text.chars().count()
            ));
            Correction {
                text,
                corrected: true,
            }
        }
        Ok(None) => {
            sink.warn("Correction service returned no text; using the raw transcript");
            Correction::fallback(raw)
        }
        Err(e) => {
            sink.error(format!("Correction failed: {}; using the raw transcript", e));
            Correction::fallback(raw)
        }
    }
}
