//! HTTP to worker-pool dispatch bridge.
//!
//! Registered routes become pool message types; each matched request is
//! wrapped in an envelope, handed to the pool, and the worker's reply is
//! turned back into an HTTP response.

// Request path
pub mod bridge;
pub mod http;
pub mod routing;

// Worker side
pub mod handlers;
pub mod pool;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use bridge::RequestEnvelope;
pub use config::BridgeConfig;
pub use http::HttpServer;
pub use lifecycle::{initialize, Bridge, Shutdown};
pub use pool::{Finished, Handler, HandlerRegistry, WorkerPool};
