//! Shutdown coordination.
//!
//! One `Shutdown` is shared by the HTTP server, the pool monitor and the
//! exit-on-stop watcher; each worker pool owns another for its workers.
//! Triggering is sticky: a task that starts waiting after the trigger still
//! sees it.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Receiver for tasks that `select!` on shutdown alongside other work.
    /// Only triggers after this call are delivered; see [`Shutdown::signalled`].
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Resolves once shutdown has been triggered, including before this call.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        // Subscribe before reading the flag so a concurrent trigger is not lost.
        let mut rx = self.tx.subscribe();
        let triggered = self.triggered.clone();
        async move {
            if !triggered.load(Ordering::SeqCst) {
                let _ = rx.recv().await;
            }
        }
    }

    /// Start shutting down. Only the first trigger is broadcast.
    pub fn trigger(&self, reason: &'static str) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(reason, "Shutdown triggered");
        let _ = self.tx.send(());
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
