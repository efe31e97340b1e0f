//! `echo`: answers with the envelope it was given.

use serde_json::json;

use crate::bridge::RequestEnvelope;
use crate::pool::Finished;

pub const ID: &str = "echo";

pub fn handle(request: RequestEnvelope, finished: Finished) {
    match serde_json::to_value(&request) {
        Ok(envelope) => finished.finish(json!({ "ok": true, "request": envelope })),
        Err(e) => finished.error(format!("Envelope not serializable: {e}"), Some(500)),
    }
}
