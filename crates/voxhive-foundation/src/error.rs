use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Audio subsystem error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Shutdown requested")]
    ShutdownRequested,

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio device unavailable: {name:?} ({reason})")]
    DeviceUnavailable {
        name: Option<String>,
        reason: String,
    },

    #[error("Format not supported: {format}")]
    FormatNotSupported { format: String },

    #[error("Frame queue overflow, depth {depth}")]
    QueueOverflow { depth: usize },

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}
