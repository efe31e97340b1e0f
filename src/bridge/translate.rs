//! Worker reply → HTTP response translation.
//!
//! Rules, applied in order:
//! 1. Drop the pool's `_pool` bookkeeping field
//! 2. Truthy `error`: status = `errorCode` (removed from the body) or 400
//!    when the code is missing or falsy
//! 3. Otherwise `http_response` may set `statusCode` (200 when missing or
//!    falsy) and `headers`; it is removed from the body
//! 4. Otherwise 200 with the reply as the body
//!
//! A reply that does not fit this shape is answered with a 500. Status codes
//! must be final (200..=599); informational codes cannot carry a body.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use crate::pool::POOL_METADATA_FIELD;

pub const ERROR_FIELD: &str = "error";
pub const ERROR_CODE_FIELD: &str = "errorCode";
pub const HTTP_RESPONSE_FIELD: &str = "http_response";

/// Status, extra headers and JSON body of a bridge response.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TranslatedResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }
}

impl IntoResponse for TranslatedResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, Json(self.body)).into_response()
    }
}

/// Translate a worker reply. Pure: equal replies give equal responses.
pub fn translate(reply: Value) -> TranslatedResponse {
    match try_translate(reply) {
        Ok(response) => response,
        Err(reason) => {
            tracing::warn!(reason, "Malformed worker reply");
            malformed_reply()
        }
    }
}

/// Response used when a reply cannot be translated.
pub fn malformed_reply() -> TranslatedResponse {
    TranslatedResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Malformed worker reply" }),
    )
}

fn try_translate(reply: Value) -> Result<TranslatedResponse, &'static str> {
    let Value::Object(mut fields) = reply else {
        return Err("reply is not an object");
    };
    fields.remove(POOL_METADATA_FIELD);

    if fields.get(ERROR_FIELD).is_some_and(is_truthy) {
        let status = match fields.remove(ERROR_CODE_FIELD) {
            Some(code) if is_truthy(&code) => {
                parse_status(&code).ok_or("errorCode is not an HTTP status")?
            }
            _ => StatusCode::BAD_REQUEST,
        };
        return Ok(TranslatedResponse::new(status, Value::Object(fields)));
    }

    let mut response = TranslatedResponse::new(StatusCode::OK, Value::Null);
    match fields.remove(HTTP_RESPONSE_FIELD) {
        None | Some(Value::Null) => {}
        Some(Value::Object(overrides)) => apply_overrides(&overrides, &mut response)?,
        Some(_) => return Err("http_response is not an object"),
    }
    response.body = Value::Object(fields);
    Ok(response)
}

fn apply_overrides(
    overrides: &Map<String, Value>,
    response: &mut TranslatedResponse,
) -> Result<(), &'static str> {
    if let Some(code) = overrides.get("statusCode").filter(|code| is_truthy(code)) {
        response.status = parse_status(code).ok_or("http_response.statusCode is not an HTTP status")?;
    }

    match overrides.get("headers") {
        None | Some(Value::Null) => {}
        Some(Value::Object(headers)) => {
            for (name, value) in headers {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| "http_response.headers has an invalid name")?;
                let value = header_value(value).ok_or("http_response.headers has an invalid value")?;
                response.headers.append(name, value);
            }
        }
        Some(_) => return Err("http_response.headers is not an object"),
    }
    Ok(())
}

/// Accepts numbers and numeric strings in 200..=599.
fn parse_status(value: &Value) -> Option<StatusCode> {
    let code = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if !(200..=599).contains(&code) {
        return None;
    }
    StatusCode::from_u16(u16::try_from(code).ok()?).ok()
}

fn header_value(value: &Value) -> Option<HeaderValue> {
    match value {
        Value::String(s) => HeaderValue::from_str(s).ok(),
        Value::Number(n) => HeaderValue::from_str(&n.to_string()).ok(),
        Value::Bool(b) => Some(HeaderValue::from_static(if *b { "true" } else { "false" })),
        _ => None,
    }
}

/// Loose truthiness: null, false, 0, "" are false; everything else is true.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_default_status() {
        let response = translate(json!({ "error": "bad" }));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body, json!({ "error": "bad" }));
        assert!(response.headers.is_empty());
    }

    #[test]
    fn test_error_code_override_is_stripped() {
        let response = translate(json!({ "error": "nope", "errorCode": 403 }));
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body, json!({ "error": "nope" }));
    }

    #[test]
    fn test_error_code_as_string() {
        let response = translate(json!({ "error": "gone", "errorCode": "410" }));
        assert_eq!(response.status, StatusCode::GONE);
    }

    #[test]
    fn test_success_override() {
        let response = translate(json!({
            "ok": true,
            "http_response": { "statusCode": 201, "headers": { "X-Id": "7" } }
        }));
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.headers.get("x-id").unwrap(), "7");
        assert_eq!(response.body, json!({ "ok": true }));
    }

    #[test]
    fn test_override_headers_only_defaults_to_200() {
        let response = translate(json!({
            "ok": true,
            "http_response": { "headers": { "Cache-Control": "no-store", "X-Count": 3 } }
        }));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers.get("cache-control").unwrap(), "no-store");
        assert_eq!(response.headers.get("x-count").unwrap(), "3");
    }

    #[test]
    fn test_falsy_codes_use_defaults() {
        for code in [json!(0), json!(false), json!(""), json!(null)] {
            let response = translate(json!({ "error": "x", "errorCode": code }));
            assert_eq!(response.status, StatusCode::BAD_REQUEST, "{code}");
            assert_eq!(response.body, json!({ "error": "x" }));

            let response = translate(json!({
                "ok": true,
                "http_response": { "statusCode": code, "headers": { "X-A": "1" } }
            }));
            assert_eq!(response.status, StatusCode::OK, "{code}");
            assert_eq!(response.headers.get("x-a").unwrap(), "1");
            assert_eq!(response.body, json!({ "ok": true }));
        }
    }

    #[test]
    fn test_plain_success() {
        let response = translate(json!({ "ok": true, "hello": "world" }));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({ "ok": true, "hello": "world" }));
    }

    #[test]
    fn test_pool_metadata_stripped() {
        let response = translate(json!({
            "userId": "rob",
            "_pool": { "workerId": 1, "messageType": "abc" }
        }));
        assert_eq!(response.body, json!({ "userId": "rob" }));

        let response = translate(json!({ "error": "x", "_pool": { "workerId": 0 } }));
        assert_eq!(response.body, json!({ "error": "x" }));
    }

    #[test]
    fn test_falsy_error_is_success() {
        let response = translate(json!({ "error": "", "value": 1 }));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({ "error": "", "value": 1 }));

        let response = translate(json!({ "error": false, "errorCode": 500 }));
        assert_eq!(response.status, StatusCode::OK);
    }

    #[test]
    fn test_error_keeps_http_response_field() {
        let response = translate(json!({
            "error": "x",
            "http_response": { "statusCode": 201 }
        }));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.get("http_response").is_some());
    }

    #[test]
    fn test_malformed_replies() {
        for reply in [
            json!("just a string"),
            json!([1, 2, 3]),
            json!(null),
            json!({ "error": "x", "errorCode": 42 }),
            json!({ "error": "x", "errorCode": "teapot" }),
            json!({ "ok": true, "http_response": "yes" }),
            json!({ "ok": true, "http_response": { "statusCode": 1000 } }),
            json!({ "ok": true, "http_response": { "statusCode": 101 } }),
            json!({ "error": "odd", "errorCode": 102 }),
            json!({ "error": "odd", "errorCode": "100" }),
            json!({ "ok": true, "http_response": { "headers": ["X-Id", "7"] } }),
            json!({ "ok": true, "http_response": { "headers": { "bad name": "v" } } }),
            json!({ "ok": true, "http_response": { "headers": { "X-Obj": {} } } }),
        ] {
            let response = translate(reply.clone());
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{reply}");
            assert_eq!(response.body, json!({ "error": "Malformed worker reply" }));
        }
    }

    #[test]
    fn test_translation_is_pure() {
        let reply = json!({
            "ok": true,
            "http_response": { "statusCode": 202, "headers": { "X-A": "1" } },
            "_pool": { "workerId": 3 }
        });
        assert_eq!(translate(reply.clone()), translate(reply.clone()));

        let reply = json!({ "error": "nope", "errorCode": 403 });
        assert_eq!(translate(reply.clone()), translate(reply));
    }
}
