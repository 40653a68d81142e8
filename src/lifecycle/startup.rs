//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the outbound client from the timeout settings
//! - Register every configured adapter and merger, in file order
//! - Assemble the dispatcher with its failure policy and observers
//!
//! # Design Decisions
//! - Fail fast: any registration error aborts startup
//! - The registry is frozen behind an `Arc` before the first request

use std::sync::Arc;

use thiserror::Error;

use crate::adapters::UpstreamAdapter;
use crate::config::ComposerConfig;
use crate::dispatch::{AdapterRef, Dispatcher, MergerRef, ObserverSet};
use crate::error::RegistrationError;
use crate::http::HttpClient;
use crate::mergers::JsonMerger;
use crate::observability::{MetricsObserver, TracingObserver};
use crate::routing::RouteRegistry;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("adapter '{name}' has an invalid upstream URL: {source}")]
    Upstream {
        name: String,
        #[source]
        source: url::ParseError,
    },
}

/// Populate a registry from the `[[adapters]]` and `[[mergers]]` sections.
pub fn build_registry(config: &ComposerConfig, client: &HttpClient) -> Result<RouteRegistry, StartupError> {
    let mut registry = RouteRegistry::new();

    for adapter in &config.adapters {
        let upstream = UpstreamAdapter::new(adapter.name.clone(), &adapter.upstream, client.clone())
            .map_err(|source| StartupError::Upstream {
                name: adapter.name.clone(),
                source,
            })?;
        registry.register_adapter(AdapterRef::new(upstream), &adapter.route, &adapter.methods)?;
        tracing::debug!(adapter = %adapter.name, route = %adapter.route, "Adapter registered");
    }

    for merger in &config.mergers {
        let json = JsonMerger::new(merger.name.clone(), merger.strategy);
        registry.register_merger(MergerRef::new(json), &merger.route, &merger.methods)?;
        tracing::debug!(merger = %merger.name, route = %merger.route, "Merger registered");
    }

    tracing::info!(
        adapters = registry.adapter_registrations(),
        mergers = registry.merger_registrations(),
        "Route registry built"
    );
    Ok(registry)
}

/// Build the dispatcher described by `config`.
pub fn build_dispatcher(config: &ComposerConfig) -> Result<Dispatcher, StartupError> {
    let client = HttpClient::new(&config.timeouts);
    let registry = build_registry(config, &client)?;

    let mut observers = ObserverSet::new().with(Arc::new(TracingObserver));
    if config.observability.metrics_enabled {
        observers = observers.with(Arc::new(MetricsObserver));
    }

    Ok(Dispatcher::new(Arc::new(registry))
        .with_failure_policy(config.fan_out.on_failure)
        .with_observer(Arc::new(observers)))
}
