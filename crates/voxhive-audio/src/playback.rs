use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};

use voxhive_foundation::AudioError;

use crate::device::open_output_device;

/// Blocking playback of synthesized audio on an output device. Failures are
/// surfaced as errors so callers can degrade (skip playback) rather than
/// crash the response path.
pub struct Playback {
    device_name: Option<String>,
}

impl Playback {
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }

    pub fn play(&self, samples: &[i16], sample_rate: u32) -> Result<(), AudioError> {
        if samples.is_empty() {
            return Ok(());
        }

        let device = open_output_device(self.device_name.as_deref())?;
        let sample_format = device
            .default_output_config()
            .map_err(|e| AudioError::Playback(e.to_string()))?
            .sample_format();

        let config = StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let data: Arc<Vec<i16>> = Arc::new(samples.to_vec());
        let position = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicBool::new(false));

        let err_fn = |err: cpal::StreamError| {
            tracing::error!("Playback stream error: {}", err);
        };

        let stream = match sample_format {
            SampleFormat::I16 => {
                let data = Arc::clone(&data);
                let position = Arc::clone(&position);
                let done = Arc::clone(&done);
                device
                    .build_output_stream(
                        &config,
                        move |out: &mut [i16], _: &_| {
                            fill(out, &data, &position, &done, |s| s)
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| AudioError::Playback(e.to_string()))?
            }
            SampleFormat::F32 => {
                let data = Arc::clone(&data);
                let position = Arc::clone(&position);
                let done = Arc::clone(&done);
                device
                    .build_output_stream(
                        &config,
                        move |out: &mut [f32], _: &_| {
                            fill(out, &data, &position, &done, |s| s as f32 / 32768.0)
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| AudioError::Playback(e.to_string()))?
            }
            other => {
                return Err(AudioError::FormatNotSupported {
                    format: format!("{:?}", other),
                });
            }
        };

        stream
            .play()
            .map_err(|e| AudioError::Playback(e.to_string()))?;

        // Bounded wait: audio duration plus slack for device latency.
        let duration = Duration::from_millis(samples.len() as u64 * 1000 / sample_rate as u64);
        let deadline = std::time::Instant::now() + duration + Duration::from_millis(500);
        while !done.load(Ordering::SeqCst) && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        Ok(())
    }
}

fn fill<T: Copy>(
    out: &mut [T],
    data: &[i16],
    position: &AtomicUsize,
    done: &AtomicBool,
    convert: impl Fn(i16) -> T,
) {
    let start = position.fetch_add(out.len(), Ordering::SeqCst);
    for (i, slot) in out.iter_mut().enumerate() {
        let idx = start + i;
        *slot = convert(*data.get(idx).unwrap_or(&0));
    }
    if start + out.len() >= data.len() {
        done.store(true, Ordering::SeqCst);
    }
}
