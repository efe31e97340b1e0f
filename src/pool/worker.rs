//! In-process worker pool.
//!
//! # Responsibilities
//! - Run `pool_size` workers draining one bounded queue
//! - Resolve each message's handler through the dispatch table
//! - Hand every submission its own reply future
//! - Publish lifecycle events for optional observers
//!
//! # Design Decisions
//! - Workers share the queue receiver behind an async mutex, so an idle
//!   worker takes the next job (natural load balancing, no scheduler)
//! - `separate-thread` workers own an OS thread and a current-thread runtime;
//!   a blocking handler only ever stalls its own worker
//! - A worker stays busy until its handler finishes or the submitter goes away
//! - Handler panics are caught and reported as a missing reply

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};

use crate::config::{Backpressure, PoolConfig, PoolMode};
use crate::lifecycle::Shutdown;
use crate::pool::handler::{Finished, HandlerRegistry};
use crate::pool::message::{PoolEvent, PoolMessage, POOL_METADATA_FIELD};
use crate::pool::{DispatchTable, PoolError};

const EVENT_CAPACITY: usize = 256;

struct Job {
    message: PoolMessage,
    reply: oneshot::Sender<Result<Value, PoolError>>,
}

struct Shared {
    config: PoolConfig,
    table: DispatchTable,
    handlers: HandlerRegistry,
    queue: Mutex<mpsc::Receiver<Job>>,
    events: broadcast::Sender<PoolEvent>,
}

/// Shared pool handle. Safe to submit to from any number of tasks.
pub struct WorkerPool {
    shared: Arc<Shared>,
    sender: mpsc::Sender<Job>,
    shutdown: Shutdown,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl WorkerPool {
    /// Create the pool without starting workers, so observers can subscribe
    /// before the first event.
    ///
    /// Fails if the dispatch table names a handler that is not registered.
    pub fn new(
        config: PoolConfig,
        table: DispatchTable,
        handlers: HandlerRegistry,
    ) -> Result<Self, PoolError> {
        if config.mode == PoolMode::SeparateProcess {
            return Err(PoolError::UnsupportedMode(config.mode));
        }
        if config.pool_size == 0 {
            return Err(PoolError::NoWorkers);
        }
        for (message_type, handler_id) in table.iter() {
            if !handlers.contains(handler_id) {
                return Err(PoolError::UnknownHandler {
                    message_type: message_type.clone(),
                    handler: handler_id.to_string(),
                });
            }
        }

        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                table,
                handlers,
                queue: Mutex::new(receiver),
                events,
            }),
            sender,
            shutdown: Shutdown::new(),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        })
    }

    /// Spawn the workers. Must run inside a Tokio runtime. Calling it twice
    /// is a no-op.
    pub fn start(&self) -> Result<(), PoolError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let config = &self.shared.config;
        tracing::info!(
            mode = ?config.mode,
            pool_size = config.pool_size,
            queue_capacity = config.queue_capacity,
            backpressure = ?config.backpressure,
            handlers = self.shared.handlers.len(),
            "Starting worker pool"
        );

        for worker_id in 0..config.pool_size {
            let shared = self.shared.clone();
            let shutdown = self.shutdown.subscribe();

            match config.mode {
                PoolMode::InProcess => {
                    tokio::spawn(run_worker(worker_id, shared, shutdown));
                }
                PoolMode::SeparateThread => {
                    let runtime = tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                        .map_err(PoolError::Spawn)?;
                    std::thread::Builder::new()
                        .name(format!("pool-worker-{worker_id}"))
                        .spawn(move || runtime.block_on(run_worker(worker_id, shared, shutdown)))
                        .map_err(PoolError::Spawn)?;
                }
                PoolMode::SeparateProcess => return Err(PoolError::UnsupportedMode(config.mode)),
            }
        }

        Ok(())
    }

    /// Submit a message and wait for its reply. The returned future is bound
    /// to this submission only.
    pub async fn submit(&self, message: PoolMessage) -> Result<Value, PoolError> {
        if self.is_stopped() {
            return Err(PoolError::Stopped);
        }
        if self.shared.table.handler_for(&message.message_type).is_none() {
            return Err(PoolError::UnknownMessageType(message.message_type));
        }

        let (reply, response) = oneshot::channel();
        let job = Job { message, reply };

        match self.shared.config.backpressure {
            Backpressure::Queue => self
                .sender
                .send(job)
                .await
                .map_err(|_| PoolError::Stopped)?,
            Backpressure::Reject => self.sender.try_send(job).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => PoolError::AtCapacity,
                mpsc::error::TrySendError::Closed(_) => PoolError::Stopped,
            })?,
        }

        response.await.map_err(|_| PoolError::WorkerLost)?
    }

    /// Stop accepting work and let the workers exit. Queued jobs fail with
    /// [`PoolError::Stopped`]; jobs already running complete.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Stopping worker pool");
        self.shutdown.trigger("pool stop");
        let _ = self.shared.events.send(PoolEvent::Stopped);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Subscribe to lifecycle events. The pool behaves the same with or
    /// without subscribers.
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.shared.events.subscribe()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.shared.table
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.shared.config)
            .field("message_types", &self.shared.table.len())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

async fn run_worker(worker_id: usize, shared: Arc<Shared>, mut shutdown: broadcast::Receiver<()>) {
    let _ = shared.events.send(PoolEvent::WorkerStarted { worker_id });
    tracing::debug!(worker_id, "Worker started");

    loop {
        let job = tokio::select! {
            job = async { shared.queue.lock().await.recv().await } => job,
            _ = shutdown.recv() => None,
        };
        match job {
            Some(job) => process(worker_id, &shared, job).await,
            None => break,
        }
    }

    // Anything still queued would otherwise wait forever.
    let mut queue = shared.queue.lock().await;
    queue.close();
    while let Ok(job) = queue.try_recv() {
        let _ = job.reply.send(Err(PoolError::Stopped));
    }
    drop(queue);

    tracing::debug!(worker_id, "Worker stopped");
    let _ = shared.events.send(PoolEvent::WorkerStopped { worker_id });
}

async fn process(worker_id: usize, shared: &Shared, job: Job) {
    let Job { message, mut reply } = job;
    let message_type = message.message_type;

    let handler = shared
        .table
        .handler_for(&message_type)
        .and_then(|id| shared.handlers.get(id));
    let Some(handler) = handler else {
        let _ = reply.send(Err(PoolError::UnknownMessageType(message_type)));
        return;
    };

    if shared.config.logging {
        tracing::info!(
            worker_id,
            message_type = %message_type,
            method = %message.data.method,
            path = %message.data.url_path,
            "Worker processing message"
        );
    }

    let (finished, done) = Finished::channel();
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler.handle(message.data, finished))) {
        tracing::error!(
            worker_id,
            message_type = %message_type,
            panic = ?panic,
            "Handler panicked"
        );
    }

    let result = tokio::select! {
        result = done => result,
        _ = reply.closed() => {
            tracing::warn!(worker_id, message_type = %message_type, "Submitter gone before handler finished");
            return;
        }
    };

    let outcome = match result {
        Ok(mut value) => {
            if let Some(fields) = value.as_object_mut() {
                fields.insert(
                    POOL_METADATA_FIELD.to_string(),
                    json!({ "workerId": worker_id, "messageType": message_type }),
                );
            }
            let _ = shared.events.send(PoolEvent::ReplyReceived {
                worker_id,
                message_type: message_type.clone(),
            });
            Ok(value)
        }
        Err(_) => {
            tracing::warn!(worker_id, message_type = %message_type, "Handler finished without a reply");
            Err(PoolError::NoReply)
        }
    };

    if shared.config.logging {
        tracing::info!(worker_id, message_type = %message_type, ok = outcome.is_ok(), "Worker finished message");
    }
    let _ = reply.send(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RequestEnvelope;
    use crate::routing::{MessageTypeId, RouteRegistry};
    use std::time::Duration;

    fn envelope(path: &str) -> RequestEnvelope {
        RequestEnvelope {
            method: "GET".into(),
            url_path: path.into(),
            route_pattern: path.into(),
            ..RequestEnvelope::default()
        }
    }

    fn pool_with(config: PoolConfig, handlers: HandlerRegistry) -> WorkerPool {
        let mut registry = RouteRegistry::new();
        registry.register("get", "/echo", "echo").unwrap();
        registry.register("get", "/slow", "slow").unwrap();
        let (_, table) = registry.freeze();
        WorkerPool::new(config, table, handlers).unwrap()
    }

    fn handlers() -> HandlerRegistry {
        HandlerRegistry::new()
            .with("echo", |req: RequestEnvelope, done: Finished| {
                done.finish(json!({ "ok": true, "path": req.url_path }))
            })
            .with("slow", |_req: RequestEnvelope, done: Finished| {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    done.finish(json!({ "ok": true }));
                });
            })
    }

    fn message(path: &str) -> PoolMessage {
        PoolMessage::new(MessageTypeId::from_pattern(path), envelope(path))
    }

    #[tokio::test]
    async fn test_submit_returns_reply_with_metadata() {
        let pool = pool_with(PoolConfig::default(), handlers());
        pool.start().unwrap();

        let reply = pool.submit(message("/echo")).await.unwrap();
        assert_eq!(reply["ok"], json!(true));
        assert_eq!(reply["path"], json!("/echo"));
        assert!(reply[POOL_METADATA_FIELD]["workerId"].is_u64());
    }

    #[tokio::test]
    async fn test_separate_thread_mode() {
        let config = PoolConfig {
            mode: PoolMode::SeparateThread,
            ..PoolConfig::default()
        };
        let pool = pool_with(config, handlers());
        pool.start().unwrap();

        let reply = pool.submit(message("/echo")).await.unwrap();
        assert_eq!(reply["path"], json!("/echo"));
        pool.stop();
    }

    #[tokio::test]
    async fn test_unknown_handler_rejected_at_construction() {
        let mut registry = RouteRegistry::new();
        registry.register("get", "/missing", "missing").unwrap();
        let (_, table) = registry.freeze();

        let err = WorkerPool::new(PoolConfig::default(), table, handlers()).unwrap_err();
        assert!(matches!(err, PoolError::UnknownHandler { .. }));
    }

    #[tokio::test]
    async fn test_process_mode_unsupported() {
        let config = PoolConfig {
            mode: PoolMode::SeparateProcess,
            ..PoolConfig::default()
        };
        let (_, table) = RouteRegistry::new().freeze();
        let err = WorkerPool::new(config, table, HandlerRegistry::new()).unwrap_err();
        assert!(matches!(err, PoolError::UnsupportedMode(PoolMode::SeparateProcess)));
    }

    #[tokio::test]
    async fn test_unknown_message_type() {
        let pool = pool_with(PoolConfig::default(), handlers());
        pool.start().unwrap();
        let err = pool.submit(message("/nope")).await.unwrap_err();
        assert!(matches!(err, PoolError::UnknownMessageType(_)));
    }

    #[tokio::test]
    async fn test_stopped_pool_refuses_work() {
        let pool = pool_with(PoolConfig::default(), handlers());
        let mut events = pool.subscribe();
        pool.start().unwrap();
        pool.stop();

        assert!(matches!(pool.submit(message("/echo")).await, Err(PoolError::Stopped)));

        let mut saw_stopped = false;
        while let Ok(Ok(event)) = tokio::time::timeout(Duration::from_millis(200), events.recv()).await {
            if event == PoolEvent::Stopped {
                saw_stopped = true;
            }
        }
        assert!(saw_stopped);
    }

    #[tokio::test]
    async fn test_reject_mode_at_capacity() {
        let config = PoolConfig {
            pool_size: 1,
            queue_capacity: 1,
            backpressure: Backpressure::Reject,
            ..PoolConfig::default()
        };
        let pool = Arc::new(pool_with(config, handlers()));
        pool.start().unwrap();

        // One running on the worker, one in the queue, the third is rejected.
        let first = tokio::spawn({
            let pool = pool.clone();
            async move { pool.submit(message("/slow")).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = tokio::spawn({
            let pool = pool.clone();
            async move { pool.submit(message("/slow")).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let third = pool.submit(message("/slow")).await;
        assert!(matches!(third, Err(PoolError::AtCapacity)));

        assert!(first.await.unwrap().is_ok());
        assert!(second.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_dropped_slot_and_panic_become_no_reply() {
        let handlers = HandlerRegistry::new()
            .with("echo", |_req: RequestEnvelope, done: Finished| drop(done))
            .with("slow", |_req: RequestEnvelope, _done: Finished| panic!("handler bug"));
        let pool = pool_with(PoolConfig::default(), handlers);
        pool.start().unwrap();

        assert!(matches!(pool.submit(message("/echo")).await, Err(PoolError::NoReply)));
        assert!(matches!(pool.submit(message("/slow")).await, Err(PoolError::NoReply)));
        // Workers survive the panic.
        assert!(matches!(pool.submit(message("/echo")).await, Err(PoolError::NoReply)));
    }

    #[tokio::test]
    async fn test_lifecycle_events() {
        let config = PoolConfig {
            pool_size: 2,
            ..PoolConfig::default()
        };
        let pool = pool_with(config, handlers());
        let mut events = pool.subscribe();
        pool.start().unwrap();
        pool.submit(message("/echo")).await.unwrap();

        let mut started = 0;
        let mut replies = 0;
        while let Ok(Ok(event)) = tokio::time::timeout(Duration::from_millis(200), events.recv()).await {
            match event {
                PoolEvent::WorkerStarted { .. } => started += 1,
                PoolEvent::ReplyReceived { message_type, .. } => {
                    assert_eq!(message_type, MessageTypeId::from_pattern("/echo"));
                    replies += 1;
                }
                _ => {}
            }
        }
        assert_eq!(started, 2);
        assert_eq!(replies, 1);
    }
}
