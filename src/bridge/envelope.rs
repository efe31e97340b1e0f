//! Request envelope construction.
//!
//! # Responsibilities
//! - Turn an inbound request plus its matched route into a transport-neutral,
//!   serializable envelope
//! - Read and parse the JSON body for POST/PUT/PATCH only
//!
//! # Design Decisions
//! - Header names are lowercase; for repeated headers the LAST value wins
//! - Query parameters form a flat map; for repeated keys the LAST value wins
//! - Body problems (too large, unreadable, not JSON) leave the body absent;
//!   building an envelope never fails the request
//! - `route_pattern` is the literal registration pattern, not the request path

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::Request;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::routing::RouteMatch;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Normalized request handed to a handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    pub headers: BTreeMap<String, String>,
    pub url_path: String,
    pub hostname: String,
    pub protocol: String,
    pub path_params: BTreeMap<String, String>,
    pub query_params: BTreeMap<String, String>,
    pub route_pattern: String,
}

impl RequestEnvelope {
    /// Header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }
}

/// Build the envelope for `request`, reading at most `max_body_size` bytes
/// of body when the route's verb carries one.
pub async fn from_request(
    request: Request<Body>,
    matched: &RouteMatch,
    max_body_size: usize,
) -> RequestEnvelope {
    let (parts, body) = request.into_parts();
    let body = if matched.route.verb().carries_body() {
        read_json_body(body, max_body_size).await
    } else {
        None
    };
    build_envelope(&parts, matched, body)
}

/// Lenient body read: any failure yields `None`.
pub async fn read_json_body(body: Body, max_body_size: usize) -> Option<Value> {
    let bytes = match axum::body::to_bytes(body, max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Request body unreadable, continuing without it");
            return None;
        }
    };
    parse_json_body(&bytes)
}

/// Parse a raw body as JSON. Empty or invalid bodies yield `None`.
pub fn parse_json_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not JSON, continuing without it");
            None
        }
    }
}

/// Synchronous part of envelope construction.
pub fn build_envelope(parts: &Parts, matched: &RouteMatch, body: Option<Value>) -> RequestEnvelope {
    let (protocol, hostname) = locate(parts);

    RequestEnvelope {
        method: parts.method.as_str().to_string(),
        body,
        headers: flatten_headers(parts),
        url_path: parts.uri.path().to_string(),
        hostname,
        protocol,
        path_params: matched.params.iter().cloned().collect(),
        query_params: parse_query(parts.uri.query()),
        route_pattern: matched.route.url_pattern().to_string(),
    }
}

fn flatten_headers(parts: &Parts) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for (name, value) in parts.headers.iter() {
        headers.insert(
            name.as_str().to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    headers
}

fn parse_query(query: Option<&str>) -> BTreeMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Scheme and hostname of the request as the client addressed it.
fn locate(parts: &Parts) -> (String, String) {
    let forwarded = parts
        .headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());
    let protocol = parts
        .uri
        .scheme_str()
        .map(str::to_string)
        .or(forwarded)
        .unwrap_or_else(|| "http".to_string());

    let authority = parts
        .uri
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            parts
                .headers
                .get(axum::http::header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        });

    let hostname = authority
        .and_then(|authority| Url::parse(&format!("{protocol}://{authority}/")).ok())
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "localhost".to_string());

    (protocol, hostname)
}
