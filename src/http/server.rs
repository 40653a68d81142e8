//! Inbound serving layer.
//!
//! # Responsibilities
//! - Create the Axum router with a catch-all composer handler
//! - Normalize each inbound request into a `RequestEnvelope`
//! - Hand it to the `Dispatcher` and write the returned triple back
//! - Translate dispatch failures into server-error responses
//!
//! # Design Decisions
//! - Methods outside the dispatcher's set answer 405 without dispatching
//! - Request bodies are buffered up to `listener.max_body_bytes` (413 beyond)
//! - Every `DispatchError` becomes a 500 with a JSON `reason`

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ListenerConfig;
use crate::dispatch::Dispatcher;
use crate::http::{RequestEnvelope, ResponseTriple};
use crate::routing::Method;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_bytes: usize,
}

/// HTTP front end for the dispatcher.
pub struct ComposerServer {
    router: Router,
}

impl ComposerServer {
    pub fn new(dispatcher: Arc<Dispatcher>, config: &ListenerConfig) -> Self {
        let state = AppState {
            dispatcher,
            max_body_bytes: config.max_body_bytes,
        };
        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(compose_handler))
            .route("/", any(compose_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The underlying router, for embedding or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Composer server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Composer server stopped");
        Ok(())
    }
}

/// Convert an axum request into a dispatcher envelope.
async fn into_envelope(request: Request<Body>, limit: usize) -> Result<RequestEnvelope, ResponseTriple> {
    let (parts, body) = request.into_parts();

    let method = Method::try_from(&parts.method).map_err(|e| ResponseTriple::reason(405, e))?;

    let mut envelope = RequestEnvelope::new(method, parts.uri.path());
    if let Some(query) = parts.uri.query() {
        envelope = envelope.with_query(query);
    }
    for (name, value) in parts.headers.iter() {
        envelope = envelope.with_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }

    let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
        tracing::warn!(error = %e, limit, "Rejecting request body");
        ResponseTriple::reason(413, format!("Request body exceeds {} bytes", limit))
    })?;
    Ok(envelope.with_body(String::from_utf8_lossy(&bytes)))
}

/// Catch-all handler: one dispatch per inbound request.
async fn compose_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let envelope = match into_envelope(request, state.max_body_bytes).await {
        Ok(envelope) => envelope,
        Err(rejection) => return rejection.into_response(),
    };

    let method = envelope.method;
    let path = envelope.path.clone();

    match state.dispatcher.dispatch(envelope).await {
        Ok(triple) => triple.into_response(),
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "Dispatch failed");
            ResponseTriple::reason(500, e).into_response()
        }
    }
}
