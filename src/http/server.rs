//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: one fallback handler in front of the route table
//! - Wire up middleware (tracing, timeout, request ID)
//! - Match → build envelope → dispatch → translate, per request
//! - Serve until shutdown, then stop the pool
//!
//! # Design Decisions
//! - Matching is done by the bridge's own route table rather than Axum's
//!   router, so unmatched requests never reach the pool and precedence is
//!   under our control
//! - Handler state is read-only after startup; no locks on the request path

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::bridge::{envelope, translate, unrecognised_request, Dispatcher};
use crate::config::BridgeConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::{Bridge, Shutdown};
use crate::observability::metrics;
use crate::pool::WorkerPool;
use crate::routing::RouteTable;

/// Application state injected into the bridge handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub dispatcher: Dispatcher,
    pub max_body_size: usize,
}

/// HTTP front of the bridge.
pub struct HttpServer {
    router: Router,
    pool: Arc<WorkerPool>,
}

impl HttpServer {
    pub fn new(bridge: Bridge) -> Self {
        let config = bridge.config;
        let dispatch_timeout = Duration::from_secs(config.timeouts.dispatch_secs);

        let state = AppState {
            routes: bridge.routes,
            dispatcher: Dispatcher::new(bridge.pool.clone(), Some(dispatch_timeout)),
            max_body_size: config.limits.max_body_size,
        };

        Self {
            router: Self::build_router(&config, state),
            pool: bridge.pool,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BridgeConfig, state: AppState) -> Router {
        Router::new()
            .fallback(bridge_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then stop the pool.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.signalled().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        self.pool.stop();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every request lands here.
async fn bridge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(matched) = state.routes.match_route(&method, &path) else {
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
        let response = unrecognised_request();
        metrics::record_request(method.as_str(), response.status.as_u16(), "none", start_time);
        return response.into_response();
    };

    let route = matched.route.clone();
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        pattern = route.url_pattern(),
        handler = route.handler_id(),
        "Dispatching request"
    );

    let envelope = envelope::from_request(request, &matched, state.max_body_size).await;
    let reply = state.dispatcher.dispatch(route.message_type(), envelope).await;
    let response = translate(reply);

    tracing::debug!(
        request_id = %request_id,
        status = response.status.as_u16(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(
        method.as_str(),
        response.status.as_u16(),
        route.url_pattern(),
        start_time,
    );
    response.into_response()
}
