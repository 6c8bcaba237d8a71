//! The five pipeline stages.
//!
//! Each stage wraps one collaborator call with progress reporting to the
//! [`LogSink`](crate::logging::LogSink). Acquisition and transcription return
//! errors that end the job; correction, synthesis and persistence always
//! return a value and degrade instead.

mod acquire;
mod correct;
mod persist;
mod synthesize;
mod transcribe;

pub use acquire::{AcquiredMedia, acquire_media};
pub use correct::{Correction, correct_text};
pub use persist::{UploadOutcome, persist_artifacts};
pub use synthesize::{
    LineOutcome, LineResult, SILENCE_GAP, SynthesisReport, split_lines, synthesize_speech,
};
pub use transcribe::{PREVIEW_CHARS, join_segments, preview, transcribe};
