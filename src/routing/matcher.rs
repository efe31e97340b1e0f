//! URL pattern compilation and matching.
//!
//! # Pattern syntax
//! - `/literal` segments match exactly (case-sensitive)
//! - `/:name` captures one segment as path parameter `name`
//! - `/*` or `/*name` as the last segment captures the remaining path
//!
//! # Design Decisions
//! - Empty segments are ignored, so `/a/` and `/a` are the same path
//! - Captured segments are percent-decoded; undecodable ones are kept raw
//! - No regex, matching is a single pass over the segments

use std::cmp::Ordering;
use std::fmt;

use crate::routing::RouteError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard(Option<String>),
}

/// A compiled URL pattern. Keeps the literal string it was built from.
#[derive(Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        if raw.trim().is_empty() {
            return Err(RouteError::EmptyPattern);
        }
        if !raw.starts_with('/') {
            return Err(RouteError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "must start with '/'",
            });
        }

        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RouteError::InvalidPattern {
                        pattern: raw.to_string(),
                        reason: "parameter without a name",
                    });
                }
                segments.push(Segment::Param(name.to_string()));
            } else if let Some(name) = part.strip_prefix('*') {
                if i + 1 != parts.len() {
                    return Err(RouteError::InvalidPattern {
                        pattern: raw.to_string(),
                        reason: "wildcard must be the last segment",
                    });
                }
                let name = (!name.is_empty()).then(|| name.to_string());
                segments.push(Segment::Wildcard(name));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning captured parameters in pattern order.
    pub fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Vec::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(expected) => {
                    if parts.get(i) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.push((name.clone(), decode(value)));
                }
                Segment::Wildcard(name) => {
                    let rest = parts.get(i..).unwrap_or_default();
                    let value = rest.iter().map(|p| decode(p)).collect::<Vec<_>>().join("/");
                    params.push((name.clone().unwrap_or_else(|| "*".to_string()), value));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Whether both patterns match exactly the same paths: same literals in
    /// the same places, parameter and wildcard names ignored.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Param(_), Segment::Param(_)) => true,
                    (Segment::Wildcard(_), Segment::Wildcard(_)) => true,
                    _ => false,
                })
    }

    /// Ordering used to pick between overlapping patterns: patterns without a
    /// wildcard first, then more literal segments, then more parameters.
    pub fn specificity_cmp(&self, other: &Self) -> Ordering {
        self.specificity().cmp(&other.specificity()).reverse()
    }

    fn specificity(&self) -> (bool, usize, usize) {
        let mut literals = 0;
        let mut params = 0;
        let mut wildcard = false;
        for segment in &self.segments {
            match segment {
                Segment::Literal(_) => literals += 1,
                Segment::Param(_) => params += 1,
                Segment::Wildcard(_) => wildcard = true,
            }
        }
        (!wildcard, literals, params)
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RoutePattern").field(&self.raw).finish()
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
