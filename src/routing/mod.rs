//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     (adapter | merger, route pattern, methods)
//!     → matcher.rs (compile pattern)
//!     → registry.rs (append under each method, in order)
//!
//! Incoming Request (method, path):
//!     → registry.rs (scan patterns for the method)
//!     → matcher.rs (evaluate pattern against path)
//!     → Return: adapter set, or the first merger
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always resolves the same adapters and merger
//! - First registered match wins for mergers

pub mod matcher;
pub mod method;
pub mod registry;

pub use matcher::{Matcher, RoutePattern};
pub use method::{Method, UnsupportedMethod};
pub use registry::{Registration, RouteRegistry};
