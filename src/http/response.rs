//! Response triple shared by adapters, mergers and the dispatcher.
//!
//! # Design Decisions
//! - One shape for every producer: `(status, headers, body)`
//! - Header names are stored lowercase
//! - Conversion to an axum response happens only at the serving edge

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Body returned when no adapter is registered for a route.
pub const NO_ADAPTERS_BODY: &str = r#"{"reason": "No adapters for this route"}"#;

/// `(status, headers, body)` as produced by adapters and mergers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTriple {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ResponseTriple {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// The fixed 404 returned when a route has no adapters.
    pub fn no_adapters() -> Self {
        Self::new(404, NO_ADAPTERS_BODY)
    }

    /// JSON error body of the form `{"reason": "..."}`.
    pub fn reason(status: u16, reason: impl std::fmt::Display) -> Self {
        let body = serde_json::json!({ "reason": reason.to_string() }).to_string();
        Self::new(status, body).with_header("content-type", "application/json")
    }
}

impl IntoResponse for ResponseTriple {
    fn into_response(self) -> Response {
        let status = match StatusCode::from_u16(self.status) {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!(status = self.status, "Invalid status code in response, using 502");
                StatusCode::BAD_GATEWAY
            }
        };

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }

        response
    }
}
