//! Voice profile registry and synthesis front door

use std::collections::HashMap;

use crate::engine::Synthesizer;
use crate::error::SynthesisError;
use crate::types::{SynthesizedAudio, VoiceProfile};

/// Maps agent names to voice profiles and fronts the synthesis backend.
/// Synthesis failures degrade to `None` so a broken or absent backend never
/// takes the text pipeline down with it.
pub struct TtsManager {
    engine: Box<dyn Synthesizer>,
    profiles: HashMap<String, VoiceProfile>,
}

impl TtsManager {
    pub fn new(engine: Box<dyn Synthesizer>) -> Self {
        Self {
            engine,
            profiles: HashMap::new(),
        }
    }

    /// Registers a profile under the given agent name. The profile is
    /// validated up front so a bad reference path surfaces at registration
    /// rather than mid-conversation.
    pub fn add_profile(
        &mut self,
        agent_name: impl Into<String>,
        profile: VoiceProfile,
    ) -> Result<(), SynthesisError> {
        profile.validate()?;
        let agent_name = agent_name.into();
        tracing::info!(agent = %agent_name, voice = %profile.name, "voice profile registered");
        self.profiles.insert(agent_name, profile);
        Ok(())
    }

    pub fn remove_profile(&mut self, agent_name: &str) -> Option<VoiceProfile> {
        self.profiles.remove(agent_name)
    }

    pub fn profile(&self, agent_name: &str) -> Option<&VoiceProfile> {
        self.profiles.get(agent_name)
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Synthesizes `text` in the voice registered for `agent_name`.
    /// Returns `None` when the agent has no profile or the backend fails;
    /// callers then simply skip playback.
    pub fn synthesize_for(&self, agent_name: &str, text: &str) -> Option<SynthesizedAudio> {
        let profile = match self.profiles.get(agent_name) {
            Some(p) => p,
            None => {
                tracing::debug!(agent = %agent_name, "no voice profile, skipping synthesis");
                return None;
            }
        };
        match self.engine.synthesize(text, profile) {
            Ok(audio) => Some(audio),
            Err(SynthesisError::Unavailable) => {
                tracing::debug!("synthesis backend not configured, skipping");
                None
            }
            Err(e) => {
                tracing::warn!(agent = %agent_name, "synthesis failed: {}", e);
                None
            }
        }
    }
}
