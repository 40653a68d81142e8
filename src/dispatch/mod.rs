//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RequestEnvelope
//!     → dispatcher.rs (resolve adapters via RouteRegistry)
//!     → no adapters: fixed 404 triple
//!     → fan_out.rs (one task per adapter, join on all)
//!     → ResponseCollection
//!     → dispatcher.rs (resolve merger, merge)
//!     → ResponseTriple
//! ```
//!
//! # Design Decisions
//! - Capabilities are traits; registration only accepts values implementing them
//! - Adapters and mergers are constructed once and shared, never per request
//! - Observation is a hook (`observer.rs`), not logging inside the algorithm

pub mod capability;
pub mod dispatcher;
pub mod fan_out;
pub mod observer;

pub use capability::{Adapter, AdapterRef, FnAdapter, FnMerger, Merger, MergerRef, ResponseCollection};
pub use dispatcher::Dispatcher;
pub use fan_out::{FailurePolicy, FanOutError, FanOutExecutor};
pub use observer::{DispatchObserver, NoopObserver, ObserverSet};
