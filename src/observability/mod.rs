//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Pool lifecycle events:
//!     → monitor.rs (worker start/stop, replies per worker)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the HTTP layer's spans
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod monitor;

pub use monitor::PoolMonitor;
