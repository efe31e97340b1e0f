//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use pool_bridge::config::{BridgeConfig, PoolConfig, RouteConfig};
use pool_bridge::lifecycle::{initialize, Bridge, Shutdown};
use pool_bridge::pool::{Finished, HandlerRegistry};
use pool_bridge::{HttpServer, RequestEnvelope};

pub fn route(method: &str, url: &str, handler: &str) -> RouteConfig {
    RouteConfig {
        method: method.into(),
        url: url.into(),
        handler: handler.into(),
    }
}

/// Config with `routes`, a small pool, and no exit-on-stop.
pub fn test_config(routes: Vec<RouteConfig>) -> BridgeConfig {
    BridgeConfig {
        pool: PoolConfig {
            pool_size: 2,
            exit_on_stop: false,
            ..PoolConfig::default()
        },
        routes,
        ..BridgeConfig::default()
    }
}

/// A started bridge plus the handles tests poke at.
pub struct TestApp {
    pub bridge: Bridge,
    pub shutdown: Shutdown,
    pub router: Router,
}

pub fn start_app(config: BridgeConfig, handlers: HandlerRegistry) -> TestApp {
    let shutdown = Shutdown::new();
    let bridge = initialize(config, handlers, &shutdown).unwrap();
    let router = HttpServer::new(bridge.clone()).router();
    TestApp {
        bridge,
        shutdown,
        router,
    }
}

/// Send one request through the router and decode the JSON body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

/// Handler that counts invocations and answers `{count}`.
pub fn counting_handler(
    counter: Arc<AtomicUsize>,
) -> impl Fn(RequestEnvelope, Finished) + Send + Sync + 'static {
    move |_request: RequestEnvelope, finished: Finished| {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        finished.finish(serde_json::json!({ "count": count }));
    }
}
