//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate every route (verb, pattern, duplicates, handler conflicts)
//! - Validate value ranges (pool size, timeouts, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{BridgeConfig, PoolMode};
use crate::routing::{RouteError, RouteRegistry};

/// A single semantic problem in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("routes[{index}]: {source}")]
    Route {
        index: usize,
        #[source]
        source: RouteError,
    },

    #[error("no routes configured")]
    NoRoutes,

    #[error("pool.pool_size must be at least 1")]
    PoolSize,

    #[error("pool.queue_capacity must be at least 1")]
    QueueCapacity,

    #[error("pool.mode {0} is not supported: handlers are compiled into this binary")]
    PoolMode(PoolMode),

    #[error("{field} is not a valid socket address: '{value}'")]
    Address { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than 0")]
    RequestTimeout,

    #[error("timeouts.dispatch_secs ({dispatch_secs}) must be greater than 0 and below timeouts.request_secs ({request_secs})")]
    DispatchTimeout { dispatch_secs: u64, request_secs: u64 },

    #[error("observability.pool_summary_secs must be greater than 0")]
    SummaryInterval,
}

pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }
    let mut registry = RouteRegistry::new();
    for (index, route) in config.routes.iter().enumerate() {
        if let Err(source) = registry.register(&route.method, &route.url, &route.handler) {
            errors.push(ValidationError::Route { index, source });
        }
    }

    if config.pool.pool_size == 0 {
        errors.push(ValidationError::PoolSize);
    }
    if config.pool.queue_capacity == 0 {
        errors.push(ValidationError::QueueCapacity);
    }
    if config.pool.mode == PoolMode::SeparateProcess {
        errors.push(ValidationError::PoolMode(config.pool.mode));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    // The dispatch timeout must fire first so a stalled handler still gets a
    // JSON 504 instead of the request layer's bare 408.
    let timeouts = &config.timeouts;
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    } else if timeouts.dispatch_secs == 0 || timeouts.dispatch_secs >= timeouts.request_secs {
        errors.push(ValidationError::DispatchTimeout {
            dispatch_secs: timeouts.dispatch_secs,
            request_secs: timeouts.request_secs,
        });
    }
    if config.observability.pool_monitor && config.observability.pool_summary_secs == 0 {
        errors.push(ValidationError::SummaryInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    fn route(method: &str, url: &str, handler: &str) -> RouteConfig {
        RouteConfig {
            method: method.into(),
            url: url.into(),
            handler: handler.into(),
        }
    }

    fn valid() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.routes.push(route("get", "/helloworld", "helloworld"));
        config.routes.push(route("get", "/user/:userId", "user"));
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.routes.push(route("get", "", "x"));
        config.routes.push(route("brew", "/coffee", "x"));
        config.routes.push(route("get", "/helloworld", "helloworld"));
        config.pool.pool_size = 0;
        config.listener.bind_address = "not-an-address".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(matches!(
            errors[0],
            ValidationError::Route { index: 2, source: RouteError::EmptyPattern }
        ));
        assert!(matches!(
            errors[1],
            ValidationError::Route { index: 3, source: RouteError::UnsupportedMethod(_) }
        ));
        assert!(matches!(
            errors[2],
            ValidationError::Route { index: 4, source: RouteError::DuplicateRoute { .. } }
        ));
        assert!(matches!(errors[3], ValidationError::PoolSize));
        assert!(matches!(errors[4], ValidationError::Address { .. }));
    }

    #[test]
    fn test_no_routes() {
        let errors = validate_config(&BridgeConfig::default()).unwrap_err();
        assert!(matches!(errors[0], ValidationError::NoRoutes));
    }

    #[test]
    fn test_process_mode_rejected() {
        let mut config = valid();
        config.pool.mode = PoolMode::SeparateProcess;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::PoolMode(PoolMode::SeparateProcess)));
    }

    #[test]
    fn test_dispatch_timeout_must_beat_request_timeout() {
        for (dispatch_secs, request_secs) in [(5, 1), (10, 10), (0, 60)] {
            let mut config = valid();
            config.timeouts.dispatch_secs = dispatch_secs;
            config.timeouts.request_secs = request_secs;
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert!(matches!(
                errors[0],
                ValidationError::DispatchTimeout { dispatch_secs: d, request_secs: r }
                    if d == dispatch_secs && r == request_secs
            ));
        }

        let mut config = valid();
        config.timeouts.dispatch_secs = 59;
        config.timeouts.request_secs = 60;
        assert!(validate_config(&config).is_ok());
    }
}
