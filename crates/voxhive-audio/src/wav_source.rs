use std::path::{Path, PathBuf};

use hound::SampleFormat;

use voxhive_foundation::AudioError;

use crate::frame::AudioFrame;
use crate::queue::FrameSender;

/// Reads a WAV file and feeds it through the same frame queue the live
/// capture uses, so the rest of the pipeline cannot tell the difference.
/// Used for offline runs and tests.
pub struct WavFileSource {
    path: PathBuf,
    chunk_size: usize,
}

impl WavFileSource {
    pub fn new(path: impl AsRef<Path>, chunk_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            chunk_size,
        }
    }

    /// Pushes the whole file through the queue as fixed-size frames.
    /// Returns the number of frames emitted.
    pub fn run(&self, tx: &FrameSender) -> Result<usize, AudioError> {
        let mut reader = hound::WavReader::open(&self.path).map_err(|e| {
            AudioError::DeviceUnavailable {
                name: Some(self.path.display().to_string()),
                reason: e.to_string(),
            }
        })?;
        let spec = reader.spec();

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Fatal(format!("WAV read failed: {}", e)))?,
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * 32767.0).round() as i16))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Fatal(format!("WAV read failed: {}", e)))?,
            (format, bits) => {
                return Err(AudioError::FormatNotSupported {
                    format: format!("{:?} {}-bit", format, bits),
                })
            }
        };

        tracing::info!(
            "Loaded WAV source {} ({} samples @ {} Hz)",
            self.path.display(),
            samples.len(),
            spec.sample_rate
        );

        let mut frames = 0;
        for chunk in samples.chunks(self.chunk_size) {
            let frame = AudioFrame::new(chunk.to_vec(), spec.sample_rate, spec.channels);
            if !tx.send(frame) {
                break;
            }
            frames += 1;
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::frame_queue;
    use std::time::Duration;

    fn write_test_wav(path: &Path, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn chunks_file_into_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, &vec![1000i16; 2500]);

        let (tx, rx) = frame_queue(64);
        let source = WavFileSource::new(&path, 1024);
        let emitted = source.run(&tx).unwrap();
        assert_eq!(emitted, 3); // 1024 + 1024 + 452

        let first = rx.next_frame(Duration::from_millis(10)).unwrap();
        assert_eq!(first.samples.len(), 1024);
        assert_eq!(first.sample_rate, 16_000);
        rx.next_frame(Duration::from_millis(10)).unwrap();
        let last = rx.next_frame(Duration::from_millis(10)).unwrap();
        assert_eq!(last.samples.len(), 452);
    }

    #[test]
    fn missing_file_is_device_unavailable() {
        let (tx, _rx) = frame_queue(64);
        let source = WavFileSource::new("/nonexistent/audio.wav", 1024);
        assert!(matches!(
            source.run(&tx),
            Err(AudioError::DeviceUnavailable { .. })
        ));
    }
}
