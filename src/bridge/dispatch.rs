//! Dispatch of envelopes to the worker pool.
//!
//! # Responsibilities
//! - Wrap the envelope as `{type, data}` and submit it to the pool
//! - Suspend the request until the pool answers this submission
//! - Turn pool failures and timeouts into ordinary error replies
//!
//! # Design Decisions
//! - No locking here: the pool handle is shared and internally synchronized
//! - Correlation is the pool's job; each `submit` future belongs to one request
//! - Failures become `{error, errorCode}` replies so the response translator
//!   is the single place that builds HTTP responses

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::bridge::envelope::RequestEnvelope;
use crate::observability::metrics;
use crate::pool::{PoolError, PoolMessage, WorkerPool};
use crate::routing::MessageTypeId;

/// Why a dispatch produced no handler reply.
#[derive(Debug)]
pub enum DispatchFailure {
    Pool(PoolError),
    Timeout(Duration),
}

impl DispatchFailure {
    /// HTTP status reported for this failure. Always a server error.
    pub fn status(&self) -> u16 {
        match self {
            DispatchFailure::Pool(PoolError::Stopped | PoolError::AtCapacity) => 503,
            DispatchFailure::Pool(_) => 500,
            DispatchFailure::Timeout(_) => 504,
        }
    }

    /// Metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            DispatchFailure::Pool(PoolError::Stopped) => "stopped",
            DispatchFailure::Pool(PoolError::AtCapacity) => "at_capacity",
            DispatchFailure::Pool(PoolError::UnknownMessageType(_)) => "unknown_message_type",
            DispatchFailure::Pool(PoolError::NoReply) => "no_reply",
            DispatchFailure::Pool(PoolError::WorkerLost) => "worker_lost",
            DispatchFailure::Pool(_) => "pool_error",
            DispatchFailure::Timeout(_) => "timeout",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            DispatchFailure::Pool(PoolError::Stopped | PoolError::AtCapacity) => {
                "Worker pool unavailable"
            }
            DispatchFailure::Timeout(_) => "Worker did not reply in time",
            DispatchFailure::Pool(_) => "Internal error",
        }
    }

    /// The synthesized worker reply standing in for the missing one.
    pub fn to_reply(&self) -> Value {
        json!({ "error": self.message(), "errorCode": self.status() })
    }
}

/// Bridge between request tasks and the shared pool.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    pool: Arc<WorkerPool>,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// `timeout` of `None` waits for the pool indefinitely.
    pub fn new(pool: Arc<WorkerPool>, timeout: Option<Duration>) -> Self {
        Self { pool, timeout }
    }

    /// Submit `envelope` as `message_type` and return the worker reply, or a
    /// synthesized error reply if the pool could not produce one.
    pub async fn dispatch(&self, message_type: &MessageTypeId, envelope: RequestEnvelope) -> Value {
        match self.try_dispatch(message_type, envelope).await {
            Ok(reply) => reply,
            Err(failure) => {
                tracing::warn!(
                    message_type = %message_type,
                    reason = failure.reason(),
                    error = ?failure,
                    "Dispatch failed"
                );
                metrics::record_dispatch_failure(failure.reason());
                failure.to_reply()
            }
        }
    }

    pub async fn try_dispatch(
        &self,
        message_type: &MessageTypeId,
        envelope: RequestEnvelope,
    ) -> Result<Value, DispatchFailure> {
        let submission = self
            .pool
            .submit(PoolMessage::new(message_type.clone(), envelope));

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, submission)
                .await
                .map_err(|_| DispatchFailure::Timeout(limit))?,
            None => submission.await,
        };
        result.map_err(DispatchFailure::Pool)
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }
}
