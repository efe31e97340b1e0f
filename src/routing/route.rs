//! Route definitions.
//!
//! A route names an HTTP verb, the literal URL pattern it was registered with
//! and the id of the handler that serves it inside the pool.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::routing::matcher::RoutePattern;
use crate::routing::message_type::MessageTypeId;
use crate::routing::RouteError;

/// HTTP verbs a route may be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpVerb {
    /// Verbs whose requests conventionally carry a body.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpVerb::Post | HttpVerb::Put | HttpVerb::Patch)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
        }
    }

    /// Map a transport method onto a supported verb.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(HttpVerb::Get),
            Method::POST => Some(HttpVerb::Post),
            Method::PUT => Some(HttpVerb::Put),
            Method::PATCH => Some(HttpVerb::Patch),
            Method::DELETE => Some(HttpVerb::Delete),
            Method::HEAD => Some(HttpVerb::Head),
            Method::OPTIONS => Some(HttpVerb::Options),
            _ => None,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "PATCH" => Ok(HttpVerb::Patch),
            "DELETE" => Ok(HttpVerb::Delete),
            "HEAD" => Ok(HttpVerb::Head),
            "OPTIONS" => Ok(HttpVerb::Options),
            _ => Err(RouteError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// A registered route. Immutable once built.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    verb: HttpVerb,
    pattern: RoutePattern,
    handler_id: String,
    message_type: MessageTypeId,
}

impl RouteDefinition {
    /// Compile a route, deriving its message type from the URL pattern.
    pub fn new(method: &str, url_pattern: &str, handler_id: &str) -> Result<Self, RouteError> {
        let verb: HttpVerb = method.parse()?;
        let pattern = RoutePattern::parse(url_pattern)?;
        let handler_id = handler_id.trim();
        if handler_id.is_empty() {
            return Err(RouteError::EmptyHandler(url_pattern.to_string()));
        }

        Ok(Self {
            verb,
            message_type: MessageTypeId::from_pattern(pattern.as_str()),
            pattern,
            handler_id: handler_id.to_string(),
        })
    }

    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// The literal pattern string used at registration.
    pub fn url_pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    pub fn message_type(&self) -> &MessageTypeId {
        &self.message_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<HttpVerb>().unwrap(), HttpVerb::Get);
        assert_eq!("Patch".parse::<HttpVerb>().unwrap(), HttpVerb::Patch);
        assert!(matches!(
            "TRACE".parse::<HttpVerb>(),
            Err(RouteError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_body_carrying_verbs() {
        assert!(HttpVerb::Post.carries_body());
        assert!(HttpVerb::Put.carries_body());
        assert!(HttpVerb::Patch.carries_body());
        assert!(!HttpVerb::Get.carries_body());
        assert!(!HttpVerb::Delete.carries_body());
        assert!(!HttpVerb::Head.carries_body());
    }

    #[test]
    fn test_route_definition_keeps_literal_pattern() {
        let route = RouteDefinition::new("get", "/user/:userId", "user").unwrap();
        assert_eq!(route.verb(), HttpVerb::Get);
        assert_eq!(route.url_pattern(), "/user/:userId");
        assert_eq!(route.handler_id(), "user");
        assert_eq!(route.message_type(), &MessageTypeId::from_pattern("/user/:userId"));
    }

    #[test]
    fn test_route_definition_rejects_bad_input() {
        assert!(matches!(
            RouteDefinition::new("get", "", "h"),
            Err(RouteError::EmptyPattern)
        ));
        assert!(matches!(
            RouteDefinition::new("fetch", "/a", "h"),
            Err(RouteError::UnsupportedMethod(_))
        ));
        assert!(matches!(
            RouteDefinition::new("get", "/a", " "),
            Err(RouteError::EmptyHandler(_))
        ));
    }
}
