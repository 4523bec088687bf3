use thiserror::Error;

/// One flushed utterance: the concatenation of the frames collected between
/// two flush boundaries. Handed to the transcriber and then discarded.
#[derive(Debug, Clone)]
pub struct Segment {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl Segment {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }
}

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("Transcription engine failed: {0}")]
    Engine(String),

    #[error("Transcription request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Transcription collaborator. Implementations may block; the segmenter calls
/// this synchronously from its own thread. Returning an empty string means
/// nothing was recognized.
pub trait Transcriber: Send {
    fn transcribe(&mut self, segment: &Segment) -> Result<String, TranscriptionError>;
}

/// Engine used when no transcription backend is configured. Keeps the
/// pipeline runnable; every segment transcribes to nothing.
#[derive(Debug, Default)]
pub struct NullTranscriber;

impl Transcriber for NullTranscriber {
    fn transcribe(&mut self, segment: &Segment) -> Result<String, TranscriptionError> {
        tracing::debug!(
            duration_ms = segment.duration_ms(),
            "null transcriber discarding segment"
        );
        Ok(String::new())
    }
}
