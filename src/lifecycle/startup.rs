//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the immutable route and dispatch tables
//! - Create the pool, attach observers, then start workers
//! - Wire pool stop to process shutdown when `exit_on_stop` is set
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Observers subscribe before `start()` so no worker event is missed
//! - Listeners are bound by the caller, after this returns (traffic only
//!   when ready)

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

use crate::config::{validate_config, BridgeConfig, ConfigError};
use crate::lifecycle::Shutdown;
use crate::observability::PoolMonitor;
use crate::pool::{HandlerRegistry, PoolError, PoolEvent, WorkerPool};
use crate::routing::{RouteError, RouteRegistry, RouteTable};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Route registration failed: {0}")]
    Route(#[from] RouteError),

    #[error("Worker pool failed to start: {0}")]
    Pool(#[from] PoolError),
}

/// Everything the HTTP layer needs, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Bridge {
    pub config: Arc<BridgeConfig>,
    pub routes: Arc<RouteTable>,
    pub pool: Arc<WorkerPool>,
}

/// Build and start the bridge. Must run inside a Tokio runtime.
pub fn initialize(
    config: BridgeConfig,
    handlers: HandlerRegistry,
    shutdown: &Shutdown,
) -> Result<Bridge, StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;

    let (routes, table) = RouteRegistry::from_config(&config.routes)?.freeze();
    for route in routes.routes() {
        tracing::info!(
            method = %route.verb(),
            pattern = route.url_pattern(),
            handler = route.handler_id(),
            message_type = %route.message_type(),
            "Route registered"
        );
    }

    let pool = Arc::new(WorkerPool::new(config.pool.clone(), table, handlers)?);

    if config.observability.pool_monitor {
        let monitor = PoolMonitor::new(
            pool.subscribe(),
            Duration::from_secs(config.observability.pool_summary_secs),
        );
        tokio::spawn(monitor.run(shutdown.subscribe()));
    }

    if config.pool.exit_on_stop {
        spawn_exit_on_stop(&pool, shutdown.clone());
    }

    pool.start()?;
    tracing::info!(
        mode = %config.pool.mode,
        pool_size = config.pool.pool_size,
        routes = routes.len(),
        "Bridge initialized"
    );

    Ok(Bridge {
        config: Arc::new(config),
        routes: Arc::new(routes),
        pool,
    })
}

/// Trigger `shutdown` once the pool reports that it stopped.
fn spawn_exit_on_stop(pool: &WorkerPool, shutdown: Shutdown) {
    let mut events = pool.subscribe();
    let mut cancelled = shutdown.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(PoolEvent::Stopped) | Err(RecvError::Closed) => {
                        if !shutdown.is_triggered() {
                            tracing::warn!("Worker pool stopped, shutting down");
                        }
                        shutdown.trigger("pool stopped");
                        break;
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                },
                _ = cancelled.recv() => break,
            }
        }
    });
}
