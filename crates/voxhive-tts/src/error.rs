//! Error types for speech synthesis

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthesisError {
    /// No synthesis backend is configured
    #[error("No synthesis backend configured")]
    Unavailable,

    /// Voice profile references audio that does not exist
    #[error("Reference audio not found: {0}")]
    ReferenceAudioMissing(PathBuf),

    /// Voice profile is malformed
    #[error("Invalid voice profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    /// Backend failed to synthesize
    #[error("Synthesis failed: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
