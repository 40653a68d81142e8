//! Error types for registration and dispatch.

use thiserror::Error;

use crate::routing::Method;

/// Boxed error returned by adapter and merger implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while populating the route registry.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The registration cannot be accepted; the registry is left untouched.
    #[error("Invalid registration for route '{route}': {reason}")]
    InvalidRegistration { route: String, reason: String },
}

/// Errors surfaced by `Dispatcher::dispatch`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Adapters matched but no merger is registered for the route.
    #[error("Found no merger for {method} {path}")]
    NoMergerFound { method: Method, path: String },

    /// An adapter returned an error.
    #[error("Adapter {adapter} failed: {source}")]
    AdapterInvocation {
        adapter: String,
        #[source]
        source: BoxError,
    },

    /// An adapter task panicked or was cancelled before completing.
    #[error("Adapter {adapter} did not complete")]
    AdapterPanicked { adapter: String },

    /// The merger returned an error.
    #[error("Merger {merger} failed: {source}")]
    MergerInvocation {
        merger: String,
        #[source]
        source: BoxError,
    },
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
