//! Message type → handler id table.
//!
//! Built once by [`RouteRegistry::freeze`](crate::routing::RouteRegistry::freeze)
//! before the pool starts. There is no way to mutate it afterwards, so worker
//! lookups need no locking.

use std::collections::HashMap;

use crate::routing::MessageTypeId;

#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: HashMap<MessageTypeId, String>,
}

impl DispatchTable {
    pub(crate) fn new(entries: HashMap<MessageTypeId, String>) -> Self {
        Self { entries }
    }

    /// Handler id bound to a message type.
    pub fn handler_for(&self, message_type: &MessageTypeId) -> Option<&str> {
        self.entries.get(message_type).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MessageTypeId, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
