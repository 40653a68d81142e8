//! Route pattern matching.
//!
//! # Responsibilities
//! - Decide whether a registration applies to a request path
//! - Compare patterns so repeated registrations share an entry
//!
//! # Design Decisions
//! - Patterns are unanchored: `users` matches `/api/users/7`
//! - Patterns are compiled once, at registration

use regex::Regex;

/// Trait for matching request paths against a registered condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// A compiled regex route pattern, as stored in the registry.
///
/// Two patterns are equal when their source strings are equal.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    regex: Regex,
}

impl RoutePattern {
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Matcher for RoutePattern {
    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RoutePattern {}
