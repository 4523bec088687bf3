use std::io::Cursor;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{Segment, Transcriber, TranscriptionError};

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
}

/// Remote transcription backend: posts the segment as a WAV body to an HTTP
/// endpoint that answers `{"text": "..."}`. Covers whisper-server style
/// deployments without binding a model into the process.
pub struct HttpTranscriber {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpTranscriber {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TranscriptionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    fn encode_wav(segment: &Segment) -> Result<Vec<u8>, TranscriptionError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: segment.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| TranscriptionError::Engine(e.to_string()))?;
            for &s in &segment.samples {
                writer
                    .write_sample(s)
                    .map_err(|e| TranscriptionError::Engine(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| TranscriptionError::Engine(e.to_string()))?;
        }
        Ok(cursor.into_inner())
    }
}

impl Transcriber for HttpTranscriber {
    fn transcribe(&mut self, segment: &Segment) -> Result<String, TranscriptionError> {
        let wav = Self::encode_wav(segment)?;
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "audio/wav")
            .body(wav)
            .send()?
            .error_for_status()?;
        let parsed: TranscribeResponse = response.json()?;
        Ok(parsed.text.trim().to_string())
    }
}
