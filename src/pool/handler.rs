//! Handler contract for code running inside a worker.
//!
//! A handler receives the request envelope and a [`Finished`] slot. Calling
//! [`Finished::finish`] consumes the slot, so a reply can be written at most
//! once. A slot dropped without a reply (including a panicking handler) turns
//! into a pool error instead of a hung request. A slot that is kept alive and
//! never written still holds the request until the dispatch timeout.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::bridge::RequestEnvelope;

/// Business logic executed by a worker.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: RequestEnvelope, finished: Finished);
}

impl<F> Handler for F
where
    F: Fn(RequestEnvelope, Finished) + Send + Sync + 'static,
{
    fn handle(&self, request: RequestEnvelope, finished: Finished) {
        self(request, finished)
    }
}

/// Write-once reply slot handed to a handler.
#[must_use = "the request only completes once `finish` is called"]
pub struct Finished {
    tx: oneshot::Sender<Value>,
}

impl Finished {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Value>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Complete the request with `reply`.
    pub fn finish(self, reply: Value) {
        // The dispatcher may have given up already; nothing left to notify.
        let _ = self.tx.send(reply);
    }

    /// Complete the request with `{error, errorCode?}`.
    pub fn error(self, message: impl Into<String>, error_code: Option<u16>) {
        let mut reply = json!({ "error": message.into() });
        if let Some(code) = error_code {
            reply["errorCode"] = json!(code);
        }
        self.finish(reply);
    }
}

impl fmt::Debug for Finished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finished")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Handlers addressable by id from the dispatch table.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `id`, replacing any previous one.
    pub fn register(&mut self, id: impl Into<String>, handler: impl Handler) -> &mut Self {
        self.handlers.insert(id.into(), Arc::new(handler));
        self
    }

    pub fn with(mut self, id: impl Into<String>, handler: impl Handler) -> Self {
        self.register(id, handler);
        self
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.handlers.keys().collect();
        ids.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &ids).finish()
    }
}
