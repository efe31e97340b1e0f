//! Worker pool subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch Bridge
//!     → WorkerPool::submit({type, data})
//!     → bounded queue (queue or reject when full)
//!     → worker.rs (idle worker takes the job)
//!     → dispatch_table.rs (type → handler id) → handler.rs (handler + Finished slot)
//!     → reply (+ `_pool` bookkeeping) → the submitter's own reply future
//!
//! Lifecycle events (advisory):
//!     WorkerStarted / WorkerStopped / ReplyReceived / Stopped
//!     → broadcast to zero or more subscribers
//! ```
//!
//! # Design Decisions
//! - The bridge treats the pool as a black box: `submit` is the only call on
//!   the request path
//! - Each submission owns a oneshot reply channel, so replies cannot cross
//! - Dispatch table and handler registry are fixed before workers start

pub mod dispatch_table;
pub mod handler;
pub mod message;
pub mod worker;

use thiserror::Error;

use crate::config::PoolMode;
use crate::routing::MessageTypeId;

pub use dispatch_table::DispatchTable;
pub use handler::{Finished, Handler, HandlerRegistry};
pub use message::{PoolEvent, PoolMessage, POOL_METADATA_FIELD};
pub use worker::WorkerPool;

/// Errors raised by the pool, at construction or per submission.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool has been stopped.
    #[error("worker pool is stopped")]
    Stopped,

    /// Reject mode and the queue is full.
    #[error("worker pool is at capacity")]
    AtCapacity,

    /// No dispatch table entry for this message type.
    #[error("no handler bound to message type {0}")]
    UnknownMessageType(MessageTypeId),

    /// The handler dropped its reply slot or panicked.
    #[error("handler finished without a reply")]
    NoReply,

    /// The worker went away while the submission was in flight.
    #[error("worker dropped the request")]
    WorkerLost,

    #[error("message type {message_type} is bound to unregistered handler '{handler}'")]
    UnknownHandler {
        message_type: MessageTypeId,
        handler: String,
    },

    #[error("pool mode {0} is not supported")]
    UnsupportedMode(PoolMode),

    #[error("pool size must be at least 1")]
    NoWorkers,

    #[error("failed to spawn worker: {0}")]
    Spawn(std::io::Error),
}
