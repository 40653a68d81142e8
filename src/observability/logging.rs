//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Log the dispatch pipeline through a `DispatchObserver`
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level
//! - Per-request events at debug, failures at warn

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::dispatch::{AdapterRef, DispatchObserver, MergerRef};
use crate::error::DispatchError;
use crate::http::RequestEnvelope;

/// Install the global subscriber. Returns an error if one is already set.
pub fn init(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let default_filter = format!(
        "api_composer={level},tower_http={level}",
        level = config.log_level
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Observer that turns dispatch events into log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn route_resolved(&self, request: &RequestEnvelope, adapters: &[AdapterRef]) {
        if adapters.is_empty() {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                "No adapters for route"
            );
        } else {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                adapters = adapters.len(),
                "Dispatching"
            );
        }
    }

    fn adapter_dispatched(&self, request: &RequestEnvelope, adapter: &AdapterRef) {
        tracing::debug!(path = %request.path, adapter = adapter.name(), "  -> adapter");
    }

    fn adapter_failed(&self, request: &RequestEnvelope, error: &DispatchError) {
        tracing::warn!(
            method = %request.method,
            path = %request.path,
            error = %error,
            "Adapter failed, abandoning dispatch"
        );
    }

    fn merge_invoked(&self, request: &RequestEnvelope, merger: &MergerRef) {
        tracing::debug!(path = %request.path, merger = merger.name(), "Merging");
    }
}
