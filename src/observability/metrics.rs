//! Metrics collection and exposition.
//!
//! # Metrics
//! - `composer_dispatch_total` (counter): dispatches with at least one adapter
//! - `composer_no_adapters_total` (counter): dispatches answered with the fixed 404
//! - `composer_adapter_calls_total` (counter): adapter invocations, by adapter
//! - `composer_adapter_failures_total` (counter): fan-outs stopped by a failure
//! - `composer_merges_total` (counter): merger invocations, by merger

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::dispatch::{AdapterRef, DispatchObserver, MergerRef};
use crate::error::DispatchError;
use crate::http::RequestEnvelope;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Observer that counts dispatch events.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsObserver;

impl DispatchObserver for MetricsObserver {
    fn route_resolved(&self, request: &RequestEnvelope, adapters: &[AdapterRef]) {
        let method = request.method.as_str();
        if adapters.is_empty() {
            ::metrics::counter!("composer_no_adapters_total", "method" => method).increment(1);
        } else {
            ::metrics::counter!("composer_dispatch_total", "method" => method).increment(1);
        }
    }

    fn adapter_dispatched(&self, _request: &RequestEnvelope, adapter: &AdapterRef) {
        ::metrics::counter!("composer_adapter_calls_total", "adapter" => adapter.name().to_string())
            .increment(1);
    }

    fn adapter_failed(&self, _request: &RequestEnvelope, error: &DispatchError) {
        let kind = match error {
            DispatchError::AdapterPanicked { .. } => "panic",
            _ => "error",
        };
        ::metrics::counter!("composer_adapter_failures_total", "kind" => kind).increment(1);
    }

    fn merge_invoked(&self, _request: &RequestEnvelope, merger: &MergerRef) {
        ::metrics::counter!("composer_merges_total", "merger" => merger.name().to_string())
            .increment(1);
    }
}
