//! Request dispatch: resolve, fan out, merge.
//!
//! # Responsibilities
//! - Resolve the adapters registered for the request's method and path
//! - Short-circuit with the fixed 404 triple when there are none
//! - Invoke every adapter concurrently and collect their responses
//! - Resolve the route's merger and return its output untouched
//!
//! # Design Decisions
//! - No retries and no dispatcher-level timeout; outbound calls carry their own
//! - Merger resolution happens after the fan-out, so a missing merger still costs the backend calls
//! - Observability goes through `DispatchObserver`, never inline

use std::sync::Arc;

use crate::dispatch::fan_out::{FailurePolicy, FanOutError, FanOutExecutor};
use crate::dispatch::observer::{DispatchObserver, NoopObserver};
use crate::dispatch::ResponseCollection;
use crate::error::{DispatchError, DispatchResult};
use crate::http::{RequestEnvelope, ResponseTriple};
use crate::routing::RouteRegistry;

/// Entry point called once per inbound request.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
    executor: FanOutExecutor,
    observer: Arc<dyn DispatchObserver>,
}

impl Dispatcher {
    /// Create a dispatcher over a fully populated registry.
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self {
            registry,
            executor: FanOutExecutor::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.executor = FanOutExecutor::new(policy);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.executor.policy()
    }

    /// Dispatch one request to every matching adapter and merge the results.
    pub async fn dispatch(
        &self,
        request: impl Into<Arc<RequestEnvelope>>,
    ) -> DispatchResult<ResponseTriple> {
        let request: Arc<RequestEnvelope> = request.into();

        let adapters = self.registry.resolve_adapters(request.method, &request.path);
        self.observer.route_resolved(&request, &adapters);
        if adapters.is_empty() {
            return Ok(ResponseTriple::no_adapters());
        }

        let tasks: Vec<_> = adapters
            .into_iter()
            .enumerate()
            .map(|(position, adapter)| {
                self.observer.adapter_dispatched(&request, &adapter);
                let target = Arc::clone(adapter.adapter());
                let request = Arc::clone(&request);
                ((position, adapter), async move { target.handle(&request).await })
            })
            .collect();

        let mut completed = match self.executor.run(tasks).await {
            Ok(completed) => completed,
            Err(failure) => {
                let error = match failure {
                    FanOutError::Failed { key: (_, adapter), error } => {
                        DispatchError::AdapterInvocation {
                            adapter: adapter.name().to_string(),
                            source: error,
                        }
                    }
                    FanOutError::Panicked { key: (_, adapter) } => DispatchError::AdapterPanicked {
                        adapter: adapter.name().to_string(),
                    },
                };
                self.observer.adapter_failed(&request, &error);
                return Err(error);
            }
        };

        // Completion order varies; insert in resolution order instead.
        completed.sort_by_key(|((position, _), _)| *position);
        let mut responses = ResponseCollection::new();
        for ((_, adapter), response) in completed {
            responses.push(adapter, response);
        }

        let merger = self.registry.resolve_merger(request.method, &request.path)?;
        self.observer.merge_invoked(&request, &merger);

        merger
            .merger()
            .merge(&request, responses)
            .await
            .map_err(|source| DispatchError::MergerInvocation {
                merger: merger.name().to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{AdapterRef, FnAdapter, FnMerger, MergerRef};
    use crate::error::BoxError;
    use crate::routing::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn fixed(name: &str, status: u16, body: &'static str) -> AdapterRef {
        AdapterRef::new(FnAdapter::new(name, move |_req: &RequestEnvelope| async move {
            Ok(ResponseTriple::new(status, body))
        }))
    }

    fn slow(name: &str, delay: Duration, body: &'static str) -> AdapterRef {
        AdapterRef::new(FnAdapter::new(name, move |_req: &RequestEnvelope| async move {
            tokio::time::sleep(delay).await;
            Ok(ResponseTriple::new(200, body))
        }))
    }

    fn counting(name: &str, calls: Arc<AtomicUsize>) -> AdapterRef {
        AdapterRef::new(FnAdapter::new(name, move |_req: &RequestEnvelope| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(ResponseTriple::new(200, "counted")) }
        }))
    }

    fn failing(name: &str) -> AdapterRef {
        AdapterRef::new(FnAdapter::new(name, |_req: &RequestEnvelope| async {
            Err::<ResponseTriple, BoxError>("backend unreachable".into())
        }))
    }

    /// Merger that records every collection it receives.
    fn recording(seen: Arc<Mutex<Vec<ResponseCollection>>>) -> MergerRef {
        MergerRef::new(FnMerger::new(
            "recording",
            move |_req: &RequestEnvelope, responses: ResponseCollection| {
                seen.lock().unwrap().push(responses);
                async { Ok(ResponseTriple::new(200, "merged")) }
            },
        ))
    }

    fn dispatcher(registry: RouteRegistry) -> Dispatcher {
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_no_adapters_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut registry = RouteRegistry::new();
        registry.register_adapter(counting("orders", calls.clone()), "^/orders", &[]).unwrap();
        registry.register_merger(recording(seen.clone()), ".*", &[]).unwrap();

        let result = dispatcher(registry)
            .dispatch(RequestEnvelope::new(Method::Get, "/users"))
            .await
            .unwrap();

        assert_eq!(result.status, 404);
        assert!(result.headers.is_empty());
        assert_eq!(result.body, r#"{"reason": "No adapters for this route"}"#);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merger_receives_every_adapter_response() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let a = fixed("a", 200, "a");
        let b = fixed("b", 200, "b");

        let mut registry = RouteRegistry::new();
        registry.register_adapter(a.clone(), "^/users$", &[Method::Get]).unwrap();
        registry.register_adapter(b.clone(), "^/users$", &[Method::Get]).unwrap();
        registry.register_merger(recording(seen.clone()), "^/users$", &[Method::Get]).unwrap();

        let result = dispatcher(registry)
            .dispatch(RequestEnvelope::new(Method::Get, "/users"))
            .await
            .unwrap();
        assert_eq!(result, ResponseTriple::new(200, "merged"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "merger must be called exactly once");
        let responses = &seen[0];
        assert_eq!(responses.len(), 2);
        assert_eq!(responses.get(&a).unwrap(), &[ResponseTriple::new(200, "a")]);
        assert_eq!(responses.get(&b).unwrap(), &[ResponseTriple::new(200, "b")]);
    }

    #[tokio::test]
    async fn test_overlapping_routes_invoke_adapter_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let adapter = counting("users", calls.clone());

        let mut registry = RouteRegistry::new();
        registry.register_adapter(adapter.clone(), "^/users", &[]).unwrap();
        registry.register_adapter(adapter.clone(), "users", &[]).unwrap();
        registry.register_merger(recording(seen.clone()), "users", &[]).unwrap();

        dispatcher(registry)
            .dispatch(RequestEnvelope::new(Method::Post, "/users"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(seen.lock().unwrap()[0].get(&adapter).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_merger_output_returned_unchanged() {
        let mut registry = RouteRegistry::new();
        registry.register_adapter(fixed("a", 503, "down"), "/", &[]).unwrap();
        registry
            .register_merger(
                MergerRef::new(FnMerger::new(
                    "teapot",
                    |_req: &RequestEnvelope, _responses: ResponseCollection| async {
                        Ok(ResponseTriple::new(418, "short and stout").with_header("x-kind", "teapot"))
                    },
                )),
                "/",
                &[],
            )
            .unwrap();

        let result = dispatcher(registry)
            .dispatch(RequestEnvelope::new(Method::Get, "/"))
            .await
            .unwrap();
        assert_eq!(result.status, 418);
        assert_eq!(result.body, "short and stout");
        assert_eq!(result.headers.get("x-kind").map(String::as_str), Some("teapot"));
    }

    #[tokio::test]
    async fn test_missing_merger_fails_dispatch() {
        let mut registry = RouteRegistry::new();
        registry.register_adapter(fixed("a", 200, "a"), "^/users", &[]).unwrap();
        registry
            .register_merger(recording(Arc::new(Mutex::new(Vec::new()))), "^/users", &[Method::Get])
            .unwrap();

        let err = dispatcher(registry)
            .dispatch(RequestEnvelope::new(Method::Delete, "/users"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::NoMergerFound { method: Method::Delete, ref path } if path == "/users"
        ));
    }

    #[tokio::test]
    async fn test_slow_adapter_is_awaited() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = RouteRegistry::new();
        registry.register_adapter(fixed("fast", 200, "fast"), "^/feed", &[]).unwrap();
        registry
            .register_adapter(slow("slow", Duration::from_millis(150), "slow"), "^/feed", &[])
            .unwrap();
        registry
            .register_adapter(slow("mid", Duration::from_millis(50), "mid"), "^/feed", &[])
            .unwrap();
        registry.register_merger(recording(seen.clone()), "^/feed", &[]).unwrap();

        let dispatcher = dispatcher(registry);
        for _ in 0..3 {
            dispatcher
                .dispatch(RequestEnvelope::new(Method::Get, "/feed"))
                .await
                .unwrap();
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        for responses in seen.iter() {
            assert_eq!(responses.len(), 3);
            assert_eq!(responses.by_name("slow").next().unwrap().body, "slow");
        }
    }

    #[tokio::test]
    async fn test_responses_follow_resolution_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = slow("dup", Duration::from_millis(80), "first");
        let second = fixed("dup", 200, "second");

        let mut registry = RouteRegistry::new();
        registry.register_adapter(first, "^/dup", &[]).unwrap();
        registry.register_adapter(second, "^/dup", &[]).unwrap();
        registry.register_merger(recording(seen.clone()), "^/dup", &[]).unwrap();

        dispatcher(registry)
            .dispatch(RequestEnvelope::new(Method::Get, "/dup"))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        let bodies: Vec<_> = seen[0]
            .sorted_by_name()
            .into_iter()
            .map(|(_, responses)| responses[0].body.clone())
            .collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_adapter_failure_propagates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = RouteRegistry::new();
        registry.register_adapter(fixed("ok", 200, "ok"), "^/users", &[]).unwrap();
        registry.register_adapter(failing("broken"), "^/users", &[]).unwrap();
        registry.register_merger(recording(seen.clone()), "^/users", &[]).unwrap();

        let err = dispatcher(registry)
            .dispatch(RequestEnvelope::new(Method::Get, "/users"))
            .await
            .unwrap_err();

        match err {
            DispatchError::AdapterInvocation { adapter, source } => {
                assert_eq!(adapter, "broken");
                assert_eq!(source.to_string(), "backend unreachable");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(seen.lock().unwrap().is_empty(), "merger must not run after a failure");
    }

    #[tokio::test]
    async fn test_merger_failure_propagates() {
        let mut registry = RouteRegistry::new();
        registry.register_adapter(fixed("a", 200, "a"), "/", &[]).unwrap();
        registry
            .register_merger(
                MergerRef::new(FnMerger::new(
                    "strict",
                    |_req: &RequestEnvelope, _responses: ResponseCollection| async {
                        Err::<ResponseTriple, BoxError>("cannot merge".into())
                    },
                )),
                "/",
                &[],
            )
            .unwrap();

        let err = dispatcher(registry)
            .dispatch(RequestEnvelope::new(Method::Put, "/"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::MergerInvocation { ref merger, .. } if merger == "strict"));
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl DispatchObserver for RecordingObserver {
        fn route_resolved(&self, _request: &RequestEnvelope, adapters: &[AdapterRef]) {
            self.events.lock().unwrap().push(format!("resolved:{}", adapters.len()));
        }

        fn adapter_dispatched(&self, _request: &RequestEnvelope, adapter: &AdapterRef) {
            self.events.lock().unwrap().push(format!("dispatched:{}", adapter.name()));
        }

        fn merge_invoked(&self, _request: &RequestEnvelope, merger: &MergerRef) {
            self.events.lock().unwrap().push(format!("merge:{}", merger.name()));
        }
    }

    #[tokio::test]
    async fn test_observer_sees_pipeline_points() {
        let observer = Arc::new(RecordingObserver::default());
        let mut registry = RouteRegistry::new();
        registry.register_adapter(fixed("a", 200, "a"), "^/users", &[]).unwrap();
        registry
            .register_merger(recording(Arc::new(Mutex::new(Vec::new()))), "^/users", &[])
            .unwrap();

        let dispatcher = dispatcher(registry).with_observer(observer.clone());
        dispatcher
            .dispatch(RequestEnvelope::new(Method::Get, "/users"))
            .await
            .unwrap();
        dispatcher
            .dispatch(RequestEnvelope::new(Method::Get, "/nothing"))
            .await
            .unwrap();

        let events = observer.events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["resolved:1", "dispatched:a", "merge:recording", "resolved:0"]
        );
    }
}
