//! Pool lifecycle monitoring.
//!
//! # Responsibilities
//! - Log worker start/stop and pool stop
//! - Count replies per worker and report them periodically
//! - Feed the pool gauges and counters
//!
//! Purely an observer: the pool behaves the same whether or not a monitor
//! is attached.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time;

use crate::observability::metrics;
use crate::pool::PoolEvent;

pub struct PoolMonitor {
    events: broadcast::Receiver<PoolEvent>,
    replies: Arc<DashMap<usize, u64>>,
    summary_interval: Duration,
}

impl PoolMonitor {
    pub fn new(events: broadcast::Receiver<PoolEvent>, summary_interval: Duration) -> Self {
        Self {
            events,
            replies: Arc::new(DashMap::new()),
            summary_interval,
        }
    }

    /// Live view of replies per running worker.
    pub fn replies(&self) -> Arc<DashMap<usize, u64>> {
        self.replies.clone()
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = self.summary_interval.as_secs(),
            "Pool monitor starting"
        );

        let mut ticker = time::interval(self.summary_interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Ok(PoolEvent::Stopped) => {
                        tracing::info!("Worker pool stopped");
                        self.log_summary();
                        break;
                    }
                    Ok(event) => self.observe(event),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Pool monitor fell behind, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = ticker.tick() => self.log_summary(),
                _ = shutdown.recv() => {
                    tracing::info!("Pool monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn observe(&self, event: PoolEvent) {
        match event {
            PoolEvent::WorkerStarted { worker_id } => {
                tracing::info!(worker_id, "Worker started");
                self.replies.entry(worker_id).or_insert(0);
                metrics::set_pool_workers(self.replies.len());
            }
            PoolEvent::WorkerStopped { worker_id } => {
                tracing::info!(worker_id, "Worker stopped");
                self.replies.remove(&worker_id);
                metrics::set_pool_workers(self.replies.len());
            }
            PoolEvent::ReplyReceived {
                worker_id,
                message_type,
            } => {
                tracing::trace!(worker_id, message_type = %message_type, "Reply received");
                *self.replies.entry(worker_id).or_insert(0) += 1;
                metrics::record_worker_reply(worker_id);
            }
            PoolEvent::Stopped => {}
        }
    }

    fn log_summary(&self) {
        let mut counts: Vec<(usize, u64)> = self
            .replies
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        counts.sort_unstable();
        tracing::info!(workers = counts.len(), counts = ?counts, "Messages handled per worker");
    }
}
