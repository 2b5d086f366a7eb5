//! Process-wide cancellation signal.
//!
//! Triggered by the quit watcher, Ctrl+C, or a fatal pipeline error. The
//! capture loop polls it between ticks; async tasks can await it.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable shutdown signal. Once triggered it stays triggered.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown. Returns `true` if this call was the first.
    pub fn trigger(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until shutdown has been requested.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel can't close while we wait.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

/// Route Ctrl+C to `shutdown`.
///
/// This should be called once at program startup.
pub fn install_ctrlc_handler(shutdown: Shutdown) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if shutdown.trigger() {
            log::info!("Received Ctrl+C, shutting down");
        }
    })
}
