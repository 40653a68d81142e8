//! Outbound HTTP calls made by adapters.
//!
//! # Responsibilities
//! - Issue one request to a backend and return its `(status, headers, body)`
//! - Enforce the connect timeout and the inactivity timeout
//! - Classify failures (bad URL, transport, timeout, body)
//!
//! # Design Decisions
//! - One pooled hyper client, cloned into every adapter that needs it
//! - Inactivity bounds the wait for the response head, then every gap between body chunks
//! - Connection-level headers are dropped from responses; the body is re-framed on the way out
//! - No retries here or anywhere else; a failure goes straight back to the adapter

use std::collections::BTreeMap;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Uri};
use futures_util::StreamExt;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::time;

use crate::config::TimeoutConfig;
use crate::http::ResponseTriple;
use crate::routing::Method;

/// Headers that describe a single connection and never cross a hop.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "content-length",
    "host",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Errors returned by `HttpClient::make_request`.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid request to {url}: {reason}")]
    InvalidRequest { url: String, reason: String },

    #[error("Request {method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// No response (or no further body data) within the inactivity timeout.
    #[error("Request {method} {url} timed out after {after:?}")]
    Timeout {
        method: Method,
        url: String,
        after: Duration,
    },

    #[error("Failed reading response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Extra inputs of an outbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Shared outbound client.
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Body>,
    inactivity: Duration,
}

impl HttpClient {
    /// Build a client from the `[timeouts]` config section.
    pub fn new(config: &TimeoutConfig) -> Self {
        Self::with_timeouts(
            Duration::from_secs(config.connect_secs),
            Duration::from_secs(config.inactivity_secs),
        )
    }

    pub fn with_timeouts(connect: Duration, inactivity: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect));

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client, inactivity }
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.inactivity
    }

    /// Perform one request. Any status, including 4xx/5xx, is a successful call.
    pub async fn make_request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<ResponseTriple, HttpError> {
        tracing::debug!(
            method = %method,
            url = %url,
            body_len = options.body.len(),
            "Outbound request"
        );

        let uri: Uri = url.parse().map_err(|e: axum::http::uri::InvalidUri| {
            HttpError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let mut builder = Request::builder()
            .method(axum::http::Method::from(method))
            .uri(uri);
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(Body::from(options.body))
            .map_err(|e| HttpError::InvalidRequest {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let response = match time::timeout(self.inactivity, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(HttpError::Transport {
                    method,
                    url: url.to_string(),
                    source: e,
                })
            }
            Err(_) => {
                return Err(HttpError::Timeout {
                    method,
                    url: url.to_string(),
                    after: self.inactivity,
                })
            }
        };

        let (parts, body) = response.into_parts();
        let mut chunks = Body::new(body).into_data_stream();
        let mut bytes = Vec::new();
        loop {
            match time::timeout(self.inactivity, chunks.next()).await {
                Ok(Some(Ok(chunk))) => bytes.extend_from_slice(&chunk),
                Ok(Some(Err(e))) => {
                    return Err(HttpError::Body {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })
                }
                Ok(None) => break,
                Err(_) => {
                    return Err(HttpError::Timeout {
                        method,
                        url: url.to_string(),
                        after: self.inactivity,
                    })
                }
            }
        }

        let mut triple = ResponseTriple::new(
            parts.status.as_u16(),
            String::from_utf8_lossy(&bytes).into_owned(),
        );
        for (name, value) in parts.headers.iter() {
            if HOP_BY_HOP_HEADERS.contains(&name.as_str()) {
                continue;
            }
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            triple.headers.insert(name.as_str().to_string(), value);
        }

        tracing::debug!(
            method = %method,
            url = %url,
            status = triple.status,
            "Outbound response"
        );
        Ok(triple)
    }
}
