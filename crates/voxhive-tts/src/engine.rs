//! Synthesis backend abstraction

use crate::error::SynthesisError;
use crate::types::{SynthesizedAudio, VoiceProfile};

/// Synthesis collaborator. Implementations may block; callers run synthesis
/// from their own thread, never from the capture callback.
pub trait Synthesizer: Send + Sync {
    fn name(&self) -> &str;

    fn synthesize(
        &self,
        text: &str,
        profile: &VoiceProfile,
    ) -> Result<SynthesizedAudio, SynthesisError>;
}

/// Backend used when synthesis is not configured. Every call reports
/// `Unavailable`, which the manager downgrades to a skipped playback.
#[derive(Debug, Default)]
pub struct NullSynthesizer;

impl Synthesizer for NullSynthesizer {
    fn name(&self) -> &str {
        "null"
    }

    fn synthesize(
        &self,
        _text: &str,
        _profile: &VoiceProfile,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        Err(SynthesisError::Unavailable)
    }
}
