use serde::{Deserialize, Serialize};

/// Settings for the capture side of the audio pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Input device name; `None` selects the host default.
    pub device: Option<String>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per driver callback frame.
    pub chunk_size: usize,
    pub gate_enabled: bool,
    /// Multiplier on the rolling mean energy above which a frame counts as speech.
    pub gate_threshold: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: 16_000,
            channels: 1,
            chunk_size: 1024,
            gate_enabled: true,
            gate_threshold: 0.5,
        }
    }
}
