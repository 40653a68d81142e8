//! API composition dispatcher.
//!
//! Each inbound request is matched against registered routes, sent concurrently
//! to every adapter registered for its method and path, and answered with the
//! output of the route's merger.
//!
//! ```text
//! RequestEnvelope ─▶ RouteRegistry ─▶ FanOutExecutor ─▶ adapters ─▶ backends
//!                                                         │
//!        ResponseTriple ◀── Merger ◀── ResponseCollection ◀┘
//! ```

pub mod adapters;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod mergers;
pub mod observability;
pub mod routing;

pub use config::ComposerConfig;
pub use dispatch::{Adapter, AdapterRef, Dispatcher, Merger, MergerRef, ResponseCollection};
pub use error::{BoxError, DispatchError, RegistrationError};
pub use http::{ComposerServer, RequestEnvelope, ResponseTriple};
pub use routing::{Method, RouteRegistry};
