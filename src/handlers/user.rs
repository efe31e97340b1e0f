//! `user`: validates the `userId` path parameter.

use serde_json::json;

use crate::bridge::RequestEnvelope;
use crate::pool::Finished;

pub const ID: &str = "user";

const KNOWN_USER: &str = "rob";

pub fn handle(request: RequestEnvelope, finished: Finished) {
    match request.path_param("userId") {
        None | Some("") => finished.error("Invalid Request", None),
        Some(user) if user != KNOWN_USER => finished.error("Invalid User", None),
        Some(user) => finished.finish(json!({ "userId": user })),
    }
}
