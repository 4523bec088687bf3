use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::energy::EnergyMeter;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Multiplier on the rolling mean energy above which a frame is speech.
    pub threshold_factor: f32,
    /// Number of recent frame energies to keep.
    pub history_len: usize,
    /// Minimum history before the adaptive threshold is trusted.
    pub warmup_frames: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold_factor: 0.5,
            history_len: 30,
            warmup_frames: 10,
        }
    }
}

/// Classifies frames as speech/non-speech against an adaptive energy
/// threshold. Holds only a short rolling energy history; one gate instance
/// per capture pipeline, never shared.
pub struct VoiceActivityGate {
    config: GateConfig,
    meter: EnergyMeter,
    history: VecDeque<f32>,
}

impl VoiceActivityGate {
    pub fn new(config: GateConfig) -> Self {
        let history = VecDeque::with_capacity(config.history_len);
        Self {
            config,
            meter: EnergyMeter::new(),
            history,
        }
    }

    pub fn with_threshold(threshold_factor: f32) -> Self {
        Self::new(GateConfig {
            threshold_factor,
            ..GateConfig::default()
        })
    }

    pub fn is_speech(&mut self, frame: &[i16]) -> bool {
        let energy = self.meter.rms(frame);

        self.history.push_back(energy);
        if self.history.len() > self.config.history_len {
            self.history.pop_front();
        }

        let threshold = if self.history.len() >= self.config.warmup_frames {
            let mean: f32 = self.history.iter().sum::<f32>() / self.history.len() as f32;
            self.config.threshold_factor * mean
        } else {
            // Fixed low floor until the history warms up, so the first
            // utterance is not rejected outright.
            self.config.threshold_factor * 0.01
        };

        energy > threshold
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
