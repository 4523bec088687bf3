use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use voxhive_audio::FrameReceiver;

use crate::types::{Segment, Transcriber};

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// How long to wait for the next frame before treating the gap as
    /// end-of-utterance silence.
    pub poll_timeout: Duration,
    /// Maximum buffered audio before a forced flush.
    pub buffer_duration: Duration,
    pub sample_rate: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(100),
            buffer_duration: Duration::from_secs(3),
            sample_rate: 16_000,
        }
    }
}

impl SegmenterConfig {
    pub fn max_buffer_samples(&self) -> usize {
        (self.buffer_duration.as_millis() as usize * self.sample_rate as usize) / 1000
    }
}

/// Converts the continuous frame stream into discrete utterances. Frames
/// accumulate until either the buffer fills or the poll times out with data
/// pending (silence); each flush hands one `Segment` to the transcriber and
/// forwards non-empty text to the callback.
pub struct StreamingSegmenter {
    rx: FrameReceiver,
    transcriber: Box<dyn Transcriber>,
    on_text: Box<dyn FnMut(&str) + Send>,
    config: SegmenterConfig,
}

impl StreamingSegmenter {
    pub fn new(
        rx: FrameReceiver,
        transcriber: Box<dyn Transcriber>,
        config: SegmenterConfig,
        on_text: impl FnMut(&str) + Send + 'static,
    ) -> Self {
        Self {
            rx,
            transcriber,
            on_text: Box::new(on_text),
            config,
        }
    }

    /// Starts the worker on its own thread, distinct from the capture
    /// context. The capture callback never blocks on this loop.
    pub fn spawn(self) -> std::io::Result<SegmenterHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);
        let mut worker = Worker {
            rx: self.rx,
            transcriber: self.transcriber,
            on_text: self.on_text,
            config: self.config,
            buffer: Vec::new(),
        };
        let handle = thread::Builder::new()
            .name("segmenter".to_string())
            .spawn(move || worker.run(worker_running))?;
        Ok(SegmenterHandle {
            running,
            handle: Some(handle),
        })
    }
}

pub struct SegmenterHandle {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SegmenterHandle {
    /// Idempotent. The worker performs one final flush of any remaining
    /// audio before the join returns, so no utterance is dropped on
    /// shutdown. Shutdown latency is bounded by one poll interval plus the
    /// slowest in-flight transcription call.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SegmenterHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    rx: FrameReceiver,
    transcriber: Box<dyn Transcriber>,
    on_text: Box<dyn FnMut(&str) + Send>,
    config: SegmenterConfig,
    buffer: Vec<i16>,
}

impl Worker {
    fn run(&mut self, running: Arc<AtomicBool>) {
        tracing::info!("segmenter started");
        let max_samples = self.config.max_buffer_samples();

        while running.load(Ordering::SeqCst) {
            match self.rx.next_frame(self.config.poll_timeout) {
                Some(frame) => {
                    self.buffer.extend_from_slice(&frame.samples);
                    if self.buffer.len() >= max_samples {
                        self.flush();
                    }
                }
                None => {
                    // Silence policy: a poll gap with data pending marks
                    // end-of-utterance.
                    if !self.buffer.is_empty() {
                        self.flush();
                    }
                }
            }
        }

        // Final flush: drain whatever the producer managed to enqueue, then
        // transcribe the remainder.
        while let Some(frame) = self.rx.next_frame(Duration::ZERO) {
            self.buffer.extend_from_slice(&frame.samples);
            if self.buffer.len() >= max_samples {
                self.flush();
            }
        }
        self.flush();
        tracing::info!("segmenter stopped");
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let segment = Segment {
            samples: std::mem::take(&mut self.buffer),
            sample_rate: self.config.sample_rate,
        };

        match self.transcriber.transcribe(&segment) {
            Ok(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    (self.on_text)(text);
                }
            }
            Err(e) => {
                // A bad segment must never wedge the pipeline; the buffer is
                // already cleared and the next utterance proceeds.
                tracing::error!("transcription failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TranscriptionError;
    use std::sync::Mutex;
    use voxhive_audio::{frame_queue, AudioFrame};

    struct RecordingTranscriber {
        segments: Arc<Mutex<Vec<usize>>>,
        reply: Result<&'static str, ()>,
    }

    impl Transcriber for RecordingTranscriber {
        fn transcribe(&mut self, segment: &Segment) -> Result<String, TranscriptionError> {
            self.segments.lock().unwrap().push(segment.samples.len());
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(TranscriptionError::Engine("boom".into())),
            }
        }
    }

    fn frame(samples: usize) -> AudioFrame {
        AudioFrame::new(vec![500i16; samples], 16_000, 1)
    }

    fn collector() -> (Arc<Mutex<Vec<String>>>, impl FnMut(&str) + Send + 'static) {
        let texts: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&texts);
        (texts, move |t: &str| sink.lock().unwrap().push(t.to_string()))
    }

    #[test]
    fn stop_performs_exactly_one_final_flush() {
        let (tx, rx) = frame_queue(64);
        let segments = Arc::new(Mutex::new(Vec::new()));
        let transcriber = RecordingTranscriber {
            segments: Arc::clone(&segments),
            reply: Ok("hello"),
        };
        let (texts, on_text) = collector();

        for _ in 0..3 {
            tx.send(frame(512));
        }
        let mut handle = StreamingSegmenter::new(
            rx,
            Box::new(transcriber),
            SegmenterConfig::default(),
            on_text,
        )
        .spawn().unwrap();
        handle.stop();

        let seen = segments.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], 3 * 512);
        assert_eq!(texts.lock().unwrap().as_slice(), ["hello".to_string()]);
    }

    #[test]
    fn buffer_full_flushes_without_silence() {
        let (tx, rx) = frame_queue(64);
        let segments = Arc::new(Mutex::new(Vec::new()));
        let transcriber = RecordingTranscriber {
            segments: Arc::clone(&segments),
            reply: Ok("full"),
        };
        let (texts, on_text) = collector();

        // 1024-sample ceiling: two 512-sample frames trigger a flush.
        let config = SegmenterConfig {
            buffer_duration: Duration::from_millis(64),
            sample_rate: 16_000,
            ..SegmenterConfig::default()
        };
        assert_eq!(config.max_buffer_samples(), 1024);

        for _ in 0..4 {
            tx.send(frame(512));
        }
        let mut handle =
            StreamingSegmenter::new(rx, Box::new(transcriber), config, on_text).spawn().unwrap();

        // Both flushes happen from the running loop, well before any
        // silence timeout could account for them.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while texts.lock().unwrap().len() < 2 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(texts.lock().unwrap().len(), 2);
        handle.stop();
        assert_eq!(segments.lock().unwrap().as_slice(), &[1024, 1024]);
    }

    #[test]
    fn silence_gap_flushes_pending_audio() {
        let (tx, rx) = frame_queue(64);
        let segments = Arc::new(Mutex::new(Vec::new()));
        let transcriber = RecordingTranscriber {
            segments: Arc::clone(&segments),
            reply: Ok("gap"),
        };
        let (texts, on_text) = collector();

        let config = SegmenterConfig {
            poll_timeout: Duration::from_millis(20),
            ..SegmenterConfig::default()
        };
        let mut handle =
            StreamingSegmenter::new(rx, Box::new(transcriber), config, on_text).spawn().unwrap();

        tx.send(frame(512));
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while texts.lock().unwrap().is_empty() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        handle.stop();
        assert_eq!(texts.lock().unwrap().as_slice(), ["gap".to_string()]);
    }

    #[test]
    fn failed_transcription_clears_buffer_and_continues() {
        let (tx, rx) = frame_queue(64);
        let segments = Arc::new(Mutex::new(Vec::new()));
        let transcriber = RecordingTranscriber {
            segments: Arc::clone(&segments),
            reply: Err(()),
        };
        let (texts, on_text) = collector();

        tx.send(frame(512));
        let mut handle = StreamingSegmenter::new(
            rx,
            Box::new(transcriber),
            SegmenterConfig::default(),
            on_text,
        )
        .spawn().unwrap();
        handle.stop();

        // The engine failed, so no text; the buffer was still consumed.
        assert!(texts.lock().unwrap().is_empty());
        assert_eq!(segments.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_transcription_never_reaches_callback() {
        let (tx, rx) = frame_queue(64);
        let transcriber = RecordingTranscriber {
            segments: Arc::new(Mutex::new(Vec::new())),
            reply: Ok("   "),
        };
        let (texts, on_text) = collector();

        tx.send(frame(512));
        let mut handle = StreamingSegmenter::new(
            rx,
            Box::new(transcriber),
            SegmenterConfig::default(),
            on_text,
        )
        .spawn().unwrap();
        handle.stop();
        assert!(texts.lock().unwrap().is_empty());
    }
}
