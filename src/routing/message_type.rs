//! Message type identifiers.
//!
//! The id is the SHA-256 digest of the route's URL pattern, hex encoded. It is
//! the correlation key between the route table and the pool's dispatch table,
//! so it must be collision resistant: a collision would silently send requests
//! to the wrong handler.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of an id in hex characters.
pub const MESSAGE_TYPE_LEN: usize = 64;

/// Deterministic message type derived from a URL pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTypeId(String);

impl MessageTypeId {
    pub fn from_pattern(url_pattern: &str) -> Self {
        let digest = Sha256::digest(url_pattern.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
