//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration for the dispatch bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Worker pool settings.
    pub pool: PoolConfig,

    /// Route definitions mapping requests to pool handlers.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where pool workers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PoolMode {
    /// Tokio tasks on the server runtime.
    #[default]
    InProcess,
    /// One OS thread per worker.
    SeparateThread,
    /// One child process per worker. Recognized, rejected by validation.
    SeparateProcess,
}

impl fmt::Display for PoolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PoolMode::InProcess => "in-process",
            PoolMode::SeparateThread => "separate-thread",
            PoolMode::SeparateProcess => "separate-process",
        })
    }
}

/// What `submit` does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backpressure {
    /// Wait for queue space.
    #[default]
    Queue,
    /// Fail immediately (503).
    Reject,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    pub mode: PoolMode,

    /// Number of workers.
    pub pool_size: usize,

    /// Log every message a worker processes.
    pub logging: bool,

    /// Shut the HTTP server down when the pool stops.
    pub exit_on_stop: bool,

    /// Maximum queued (not yet running) messages.
    pub queue_capacity: usize,

    pub backpressure: Backpressure,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            mode: PoolMode::InProcess,
            pool_size: 2,
            logging: false,
            exit_on_stop: true,
            queue_capacity: 1024,
            backpressure: Backpressure::Queue,
        }
    }
}

/// One `[[routes]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// HTTP method (case-insensitive).
    pub method: String,

    /// URL pattern, e.g. `/user/:userId`.
    pub url: String,

    /// Handler id registered with the pool.
    pub handler: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole request timeout in seconds (enforced by the HTTP layer).
    pub request_secs: u64,

    /// How long a request may wait for its pool reply, in seconds.
    /// Must be below `request_secs`.
    pub dispatch_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            dispatch_secs: 30,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size read for POST/PUT/PATCH, in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Run the pool monitor.
    pub pool_monitor: bool,

    /// Interval between "messages handled" summaries, in seconds.
    pub pool_summary_secs: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            pool_monitor: true,
            pool_summary_secs: 20,
        }
    }
}
