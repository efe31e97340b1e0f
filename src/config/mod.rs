//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, every route compiled once)
//!     → BridgeConfig (validated, immutable)
//!     → startup builds route table + pool from it
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at process start; there is no hot reload because
//!   the route and dispatch tables must not change under traffic
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    Backpressure, BridgeConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    PoolConfig, PoolMode, RouteConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
