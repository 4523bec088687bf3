//! Text-to-speech abstraction layer for VoxHive
//!
//! Defines the synthesis trait, per-agent voice profiles, and the manager
//! that maps agent names to profiles. Synthesis is strictly optional: when
//! no backend is configured the rest of the pipeline runs text-only.

pub mod engine;
pub mod error;
pub mod manager;
pub mod types;

pub use engine::{NullSynthesizer, Synthesizer};
pub use error::SynthesisError;
pub use manager::TtsManager;
pub use types::{SynthesizedAudio, VoiceProfile};
