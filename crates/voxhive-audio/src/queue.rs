use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::frame::AudioFrame;

/// Creates the single-producer/single-consumer frame queue between the
/// capture callback and the segmenter loop. The channel is unbounded but
/// monitored: a warning is logged once when depth crosses `warn_depth`,
/// re-armed after the consumer drains below half of it.
pub fn frame_queue(warn_depth: usize) -> (FrameSender, FrameReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let sender = FrameSender {
        tx,
        warn_depth,
        warned: Arc::new(AtomicBool::new(false)),
    };
    (sender, FrameReceiver { rx })
}

#[derive(Clone)]
pub struct FrameSender {
    tx: Sender<AudioFrame>,
    warn_depth: usize,
    warned: Arc<AtomicBool>,
}

impl FrameSender {
    /// Enqueues a frame. Returns false if the consumer side is gone.
    pub fn send(&self, frame: AudioFrame) -> bool {
        let depth = self.tx.len();
        if depth >= self.warn_depth {
            if !self.warned.swap(true, Ordering::Relaxed) {
                tracing::warn!(depth, "frame queue depth exceeded threshold");
            }
        } else if depth < self.warn_depth / 2 {
            self.warned.store(false, Ordering::Relaxed);
        }
        self.tx.send(frame).is_ok()
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

pub struct FrameReceiver {
    rx: Receiver<AudioFrame>,
}

impl FrameReceiver {
    /// Blocks for up to `timeout` waiting for the next frame.
    pub fn next_frame(&self, timeout: Duration) -> Option<AudioFrame> {
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Some(frame),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains all pending frames without processing them. Used to discard
    /// stale audio after a mode switch. Returns the number dropped.
    pub fn clear(&self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(dropped, "cleared pending audio frames");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
