use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

/// Installs a Ctrl-C handler and hands out a guard the main loop can poll or
/// block on. Cancellation is cooperative throughout the pipeline: workers
/// check a flag and are joined with a bounded wait.
pub struct ShutdownHandler;

impl ShutdownHandler {
    pub fn install() -> ShutdownGuard {
        let guard = ShutdownGuard::new();
        let flag = Arc::clone(&guard.requested);
        let tx = guard.notify_tx.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            tracing::info!("Shutdown requested via Ctrl-C");
            flag.store(true, Ordering::SeqCst);
            let _ = tx.send(());
        }) {
            tracing::warn!("Failed to install Ctrl-C handler: {}", e);
        }
        guard
    }
}

#[derive(Clone)]
pub struct ShutdownGuard {
    requested: Arc<AtomicBool>,
    notify_tx: Sender<()>,
    notify_rx: Receiver<()>,
}

impl Default for ShutdownGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownGuard {
    /// A guard with no signal handler attached; useful in tests and for
    /// programmatic shutdown.
    pub fn new() -> Self {
        let (notify_tx, notify_rx) = crossbeam_channel::bounded(1);
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            notify_tx,
            notify_rx,
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
        let _ = self.notify_tx.send(());
    }

    /// Blocks until shutdown is requested or the timeout elapses. Returns
    /// true if shutdown was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_shutdown_requested() {
            return true;
        }
        match self.notify_rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => self.is_shutdown_requested(),
            Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}
