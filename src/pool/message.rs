//! Messages crossing the pool boundary.

use serde::{Deserialize, Serialize};

use crate::bridge::RequestEnvelope;
use crate::routing::MessageTypeId;

/// Field the pool attaches to object replies for its own bookkeeping.
/// The response translator strips it before anything reaches the client.
pub const POOL_METADATA_FIELD: &str = "_pool";

/// A unit of work: `{type, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolMessage {
    #[serde(rename = "type")]
    pub message_type: MessageTypeId,
    pub data: RequestEnvelope,
}

impl PoolMessage {
    pub fn new(message_type: MessageTypeId, data: RequestEnvelope) -> Self {
        Self { message_type, data }
    }
}

/// Lifecycle notifications published by the pool. Purely advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    WorkerStarted { worker_id: usize },
    WorkerStopped { worker_id: usize },
    ReplyReceived { worker_id: usize, message_type: MessageTypeId },
    Stopped,
}
