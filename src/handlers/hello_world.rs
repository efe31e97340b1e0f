//! `helloworld`: fixed greeting, or a 403 when asked to fail with `?a=error`.

use serde_json::json;

use crate::bridge::RequestEnvelope;
use crate::pool::Finished;

pub const ID: &str = "helloworld";

pub fn handle(request: RequestEnvelope, finished: Finished) {
    if request.query_param("a") == Some("error") {
        return finished.error("test error", Some(403));
    }
    finished.finish(json!({ "ok": true, "hello": "world" }));
}
