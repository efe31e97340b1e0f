//! pool-bridge binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ route table ──no match──▶ 401
//!                                         │
//!                                         ▼
//!                                  request envelope
//!                                         │
//!                                         ▼
//!                     dispatcher ──{type, data}──▶ worker pool ──▶ handler
//!                                                                    │
//!     Client Response                                                │
//!     ◀────────────── response translator ◀────────── reply ◀────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use pool_bridge::config::load_config;
use pool_bridge::handlers::demo_handlers;
use pool_bridge::lifecycle::{initialize, spawn_signal_handler, Shutdown};
use pool_bridge::observability::{logging, metrics};
use pool_bridge::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "pool-bridge", version, about = "HTTP to worker-pool dispatch bridge")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "bridge.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind.to_string();
    }

    logging::init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "pool-bridge starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        pool_mode = %config.pool.mode,
        pool_size = config.pool.pool_size,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let bind_address = config.listener.bind_address.clone();
    let bridge = initialize(config, demo_handlers(), &shutdown)?;

    // Bind last: traffic only once the pool is running.
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(bridge).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
