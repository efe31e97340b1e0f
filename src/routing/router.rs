//! Route registration and lookup.
//!
//! # Responsibilities
//! - Register routes once at startup, deriving each message type
//! - Record message type -> handler id bindings for the pool
//! - Look up the route matching a request, or report an explicit no-match
//!
//! # Design Decisions
//! - Registration consumes a mutable registry; `freeze` hands out the
//!   immutable route table and dispatch table, so nothing can be added once
//!   traffic is flowing
//! - Duplicate (method, pattern) pairs are rejected instead of last-wins;
//!   patterns that differ only by a trailing slash or parameter names count
//!   as duplicates, since the later one could never match
//! - Overlapping patterns resolve by specificity, then registration order

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;

use crate::config::RouteConfig;
use crate::pool::DispatchTable;
use crate::routing::message_type::MessageTypeId;
use crate::routing::route::{HttpVerb, RouteDefinition};
use crate::routing::RouteError;

/// Mutable registry used while the bridge is being configured.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<RouteDefinition>,
    bindings: HashMap<MessageTypeId, String>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the configured route list.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, RouteError> {
        let mut registry = Self::new();
        for route in routes {
            registry.register(&route.method, &route.url, &route.handler)?;
        }
        Ok(registry)
    }

    /// Register a route and bind its message type to `handler_id`.
    /// Returns the derived message type.
    pub fn register(
        &mut self,
        method: &str,
        url_pattern: &str,
        handler_id: &str,
    ) -> Result<MessageTypeId, RouteError> {
        let route = RouteDefinition::new(method, url_pattern, handler_id)?;

        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.verb() == route.verb() && r.pattern().same_shape(route.pattern()))
        {
            return Err(RouteError::DuplicateRoute {
                method: route.verb(),
                pattern: route.url_pattern().to_string(),
                existing: existing.url_pattern().to_string(),
            });
        }

        // One message type per pattern: every verb on a pattern must share a handler.
        if let Some(existing) = self.bindings.get(route.message_type()) {
            if existing != route.handler_id() {
                return Err(RouteError::ConflictingHandler {
                    pattern: route.url_pattern().to_string(),
                    existing: existing.clone(),
                    requested: route.handler_id().to_string(),
                });
            }
        }

        tracing::debug!(
            method = %route.verb(),
            pattern = %route.url_pattern(),
            handler = %route.handler_id(),
            message_type = %route.message_type(),
            "Route registered"
        );

        let message_type = route.message_type().clone();
        self.bindings
            .insert(message_type.clone(), route.handler_id().to_string());
        self.routes.push(route);
        Ok(message_type)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze into the read-only route table and the pool's dispatch table.
    pub fn freeze(self) -> (RouteTable, DispatchTable) {
        let mut routes: Vec<Arc<RouteDefinition>> = self.routes.into_iter().map(Arc::new).collect();
        routes.sort_by(|a, b| a.pattern().specificity_cmp(b.pattern()));
        (RouteTable { routes }, DispatchTable::new(self.bindings))
    }
}

/// A matched route together with the captured path parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteDefinition>,
    pub params: Vec<(String, String)>,
}

/// Immutable route table shared by all request tasks.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<RouteDefinition>>,
}

impl RouteTable {
    /// Find the route for a method and path. `None` means the request is
    /// unrecognised and must not reach the pool.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let verb = HttpVerb::from_method(method)?;
        self.routes
            .iter()
            .filter(|route| route.verb() == verb)
            .find_map(|route| {
                route.pattern().match_path(path).map(|params| RouteMatch {
                    route: route.clone(),
                    params,
                })
            })
    }

    pub fn routes(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
