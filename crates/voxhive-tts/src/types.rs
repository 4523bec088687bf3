//! Core types for speech synthesis

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;

/// Per-agent voice: a short reference recording the backend clones, plus the
/// language to synthesize in. One profile per agent name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceProfile {
    pub name: String,
    /// Path to a short WAV sample of the target voice
    pub reference_audio: PathBuf,
    /// Language code (e.g. "en")
    pub language: String,
}

impl VoiceProfile {
    pub fn new(
        name: impl Into<String>,
        reference_audio: impl Into<PathBuf>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            reference_audio: reference_audio.into(),
            language: language.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SynthesisError> {
        if self.name.trim().is_empty() {
            return Err(SynthesisError::InvalidProfile {
                name: self.name.clone(),
                reason: "empty name".to_string(),
            });
        }
        if self.language.trim().is_empty() {
            return Err(SynthesisError::InvalidProfile {
                name: self.name.clone(),
                reason: "empty language".to_string(),
            });
        }
        if !self.reference_audio.is_file() {
            return Err(SynthesisError::ReferenceAudioMissing(
                self.reference_audio.clone(),
            ));
        }
        Ok(())
    }
}

/// PCM output of one synthesis call, ready for the playback device.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl SynthesizedAudio {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }
}
