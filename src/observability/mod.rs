//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher hooks (route resolved, adapter dispatched/failed, merge invoked)
//!     → logging.rs (TracingObserver: structured log events)
//!     → metrics.rs (MetricsObserver: counters)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The dispatch algorithm has no logging of its own; observers are attached at startup
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::TracingObserver;
pub use metrics::MetricsObserver;
