//! revoice library crate.
//!
//! Turns a video URL into a corrected transcript and a re-voiced audio track:
//! the worker API accepts jobs, a bounded worker pool runs the pipeline
//! against external collaborators, and progress is readable through a small
//! shared log.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

pub mod api;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod relay;
pub mod utils;

pub use error::{Error, Result};
