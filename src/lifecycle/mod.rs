//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Route/dispatch tables → Pool + observers → Start workers
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Server stops accepting → In-flight requests drain → Pool stops
//!
//! Triggers:
//!     SIGTERM/SIGINT (signals.rs)
//!     Pool stop, when exit_on_stop is set (startup.rs)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then tables, then pool, listeners last
//! - One broadcast channel reaches every long-running task

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{shutdown_signal, spawn_signal_handler};
pub use startup::{initialize, Bridge, StartupError};
