pub mod energy;
pub mod gate;

pub use energy::EnergyMeter;
pub use gate::{GateConfig, VoiceActivityGate};
