//! Terminal response for requests that match no route.

use axum::http::StatusCode;
use serde_json::json;

use crate::bridge::translate::TranslatedResponse;

pub const UNRECOGNISED_STATUS: StatusCode = StatusCode::UNAUTHORIZED;

/// Fixed answer for unmatched method + path. Never involves the pool.
pub fn unrecognised_request() -> TranslatedResponse {
    TranslatedResponse::new(UNRECOGNISED_STATUS, json!({ "error": "Unrecognised request" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognised_request_is_fixed() {
        let response = unrecognised_request();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.status.is_client_error());
        assert_eq!(response.body, json!({ "error": "Unrecognised request" }));
        assert_eq!(response, unrecognised_request());
    }
}
