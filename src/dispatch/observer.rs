//! Observation hooks for the dispatch pipeline.
//!
//! The dispatcher calls these at fixed points and never logs on its own.
//! Logging and metrics observers live in `observability`.

use std::sync::Arc;

use crate::dispatch::{AdapterRef, MergerRef};
use crate::error::DispatchError;
use crate::http::RequestEnvelope;

/// Callbacks invoked while a request is dispatched. All hooks default to no-ops.
pub trait DispatchObserver: Send + Sync {
    /// Adapters were resolved for the request. `adapters` may be empty.
    fn route_resolved(&self, _request: &RequestEnvelope, _adapters: &[AdapterRef]) {}

    /// An adapter task is about to be spawned.
    fn adapter_dispatched(&self, _request: &RequestEnvelope, _adapter: &AdapterRef) {}

    /// The fan-out stopped on a failing adapter.
    fn adapter_failed(&self, _request: &RequestEnvelope, _error: &DispatchError) {}

    /// The merger is about to be called.
    fn merge_invoked(&self, _request: &RequestEnvelope, _merger: &MergerRef) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}

/// Fans each event out to several observers, in insertion order.
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn DispatchObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl DispatchObserver for ObserverSet {
    fn route_resolved(&self, request: &RequestEnvelope, adapters: &[AdapterRef]) {
        for o in &self.observers {
            o.route_resolved(request, adapters);
        }
    }

    fn adapter_dispatched(&self, request: &RequestEnvelope, adapter: &AdapterRef) {
        for o in &self.observers {
            o.adapter_dispatched(request, adapter);
        }
    }

    fn adapter_failed(&self, request: &RequestEnvelope, error: &DispatchError) {
        for o in &self.observers {
            o.adapter_failed(request, error);
        }
    }

    fn merge_invoked(&self, request: &RequestEnvelope, merger: &MergerRef) {
        for o in &self.observers {
            o.merge_invoked(request, merger);
        }
    }
}
