use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use voxhive_foundation::{AudioConfig, AudioError};
use voxhive_vad::{GateConfig, VoiceActivityGate};

use crate::device::open_input_device;
use crate::frame::AudioFrame;
use crate::queue::FrameSender;

#[derive(Debug, Default)]
pub struct CaptureStats {
    pub frames_captured: AtomicU64,
    pub frames_gated: AtomicU64,
    pub frames_dropped: AtomicU64,
}

/// Bridges the push-style cpal callback to the pull-style frame queue. The
/// callback copies samples out of the driver buffer, runs the gate when
/// enabled, and enqueues accepted frames. It never blocks on downstream work.
pub struct AudioCapture {
    config: AudioConfig,
    stream: Option<cpal::Stream>,
    tx: FrameSender,
    running: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
}

impl AudioCapture {
    pub fn new(config: AudioConfig, tx: FrameSender, running: Arc<AtomicBool>) -> Self {
        Self {
            config,
            stream: None,
            tx,
            running,
            stats: Arc::new(CaptureStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<CaptureStats> {
        Arc::clone(&self.stats)
    }

    /// Opens the device and starts streaming. Idempotent: a second call while
    /// running is a no-op with a warning. Device-open failure is fatal to the
    /// call and surfaces to the caller; there is no retry.
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.stream.is_some() {
            tracing::warn!("audio capture already running");
            return Ok(());
        }

        let device = open_input_device(self.config.device.as_deref())?;
        if let Ok(name) = device.name() {
            tracing::info!("Selected input device: {}", name);
        }

        let sample_format = device
            .default_input_config()
            .map_err(|e| AudioError::DeviceUnavailable {
                name: self.config.device.clone(),
                reason: e.to_string(),
            })?
            .sample_format();

        let stream_config = StreamConfig {
            channels: self.config.channels,
            sample_rate: cpal::SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = self.build_stream(device, stream_config, sample_format)?;
        stream.play().map_err(|e| AudioError::DeviceUnavailable {
            name: self.config.device.clone(),
            reason: e.to_string(),
        })?;

        self.stream = Some(stream);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn build_stream(
        &mut self,
        device: cpal::Device,
        config: StreamConfig,
        sample_format: SampleFormat,
    ) -> Result<cpal::Stream, AudioError> {
        let tx = self.tx.clone();
        let stats = Arc::clone(&self.stats);
        let running = Arc::clone(&self.running);
        let sample_rate = self.config.sample_rate;
        let channels = self.config.channels;
        let mut gate = self.config.gate_enabled.then(|| {
            VoiceActivityGate::new(GateConfig {
                threshold_factor: self.config.gate_threshold,
                ..GateConfig::default()
            })
        });

        let err_fn = |err: cpal::StreamError| {
            tracing::error!("Audio stream error: {}", err);
        };

        // The driver buffer must not be aliased past the callback, so every
        // path copies into an owned Vec before gating/enqueueing.
        let mut handle_i16 = move |samples: Vec<i16>| {
            if !running.load(Ordering::SeqCst) {
                return;
            }
            if let Some(gate) = gate.as_mut() {
                if !gate.is_speech(&samples) {
                    stats.frames_gated.fetch_add(1, Ordering::Relaxed);
                    return;
                }
            }
            let frame = AudioFrame::new(samples, sample_rate, channels);
            if tx.send(frame) {
                stats.frames_captured.fetch_add(1, Ordering::Relaxed);
            } else {
                stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
            }
        };

        let build_err = |e: cpal::BuildStreamError| AudioError::DeviceUnavailable {
            name: None,
            reason: e.to_string(),
        };

        let stream = match sample_format {
            SampleFormat::I16 => device
                .build_input_stream(
                    &config,
                    move |data: &[i16], _: &_| handle_i16(data.to_vec()),
                    err_fn,
                    None,
                )
                .map_err(build_err)?,
            SampleFormat::F32 => device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &_| handle_i16(convert_f32(data)),
                    err_fn,
                    None,
                )
                .map_err(build_err)?,
            SampleFormat::U16 => device
                .build_input_stream(
                    &config,
                    move |data: &[u16], _: &_| handle_i16(convert_u16(data)),
                    err_fn,
                    None,
                )
                .map_err(build_err)?,
            other => {
                return Err(AudioError::FormatNotSupported {
                    format: format!("{:?}", other),
                });
            }
        };

        Ok(stream)
    }

    /// Stops streaming and closes the device. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::info!("audio capture stopped");
        }
    }
}

pub(crate) fn convert_f32(data: &[f32]) -> Vec<i16> {
    data.iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0).round() as i16)
        .collect()
}

pub(crate) fn convert_u16(data: &[u16]) -> Vec<i16> {
    data.iter().map(|&s| (s as i32 - 32768) as i16).collect()
}

/// Handle to the dedicated capture thread. cpal streams are not `Send`, so
/// the `AudioCapture` lives entirely on this thread.
pub struct CaptureThread {
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl CaptureThread {
    pub fn spawn(config: AudioConfig, tx: FrameSender) -> Result<Self, AudioError> {
        let running = Arc::new(AtomicBool::new(false));
        let thread_running = Arc::clone(&running);
        let (start_tx, start_rx) = crossbeam_channel::bounded::<Result<(), AudioError>>(1);

        let handle = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || {
                let mut capture = AudioCapture::new(config, tx, thread_running.clone());
                let started = capture.start();
                let failed = started.is_err();
                let _ = start_tx.send(started);
                if failed {
                    return;
                }

                while thread_running.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(100));
                }
                capture.stop();
            })
            .map_err(|e| AudioError::Fatal(format!("Failed to spawn capture thread: {}", e)))?;

        match start_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => Ok(Self {
                handle: Some(handle),
                running,
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => Err(AudioError::Fatal(
                "Capture thread did not report startup within timeout".into(),
            )),
        }
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CaptureThread {
    fn drop(&mut self) {
        self.stop();
    }
}
