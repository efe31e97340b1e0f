//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     RouteConfig[]
//!     → route.rs (verb + pattern + handler id)
//!     → message_type.rs (SHA-256 of the pattern)
//!     → router.rs (RouteRegistry: reject duplicates, bind type → handler)
//!     → freeze → RouteTable (request side) + DispatchTable (pool side)
//!
//! Incoming Request (method, path)
//!     → RouteTable::match_route
//!     → matcher.rs (segment match, capture params)
//!     → Return: RouteMatch or no-match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - Message type depends on the pattern only, never on the verb

pub mod matcher;
pub mod message_type;
pub mod route;
pub mod router;

use thiserror::Error;

pub use matcher::RoutePattern;
pub use message_type::MessageTypeId;
pub use route::{HttpVerb, RouteDefinition};
pub use router::{RouteMatch, RouteRegistry, RouteTable};

/// Route configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route pattern is empty")]
    EmptyPattern,

    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },

    #[error("unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),

    #[error("route '{0}' has no handler")]
    EmptyHandler(String),

    #[error("duplicate route {method} {pattern} (already registered as {existing})")]
    DuplicateRoute {
        method: HttpVerb,
        pattern: String,
        existing: String,
    },

    #[error("pattern '{pattern}' is bound to handler '{existing}', cannot also bind '{requested}'")]
    ConflictingHandler {
        pattern: String,
        existing: String,
        requested: String,
    },
}
