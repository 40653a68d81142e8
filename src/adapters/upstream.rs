//! Adapter forwarding the request to one backend service.
//!
//! # Responsibilities
//! - Rewrite the envelope's path and query onto the backend base URL
//! - Forward method, body and end-to-end headers
//! - Return the backend's response as-is
//!
//! # Design Decisions
//! - Hop-by-hop headers are stripped, the rest passes through
//! - Any backend status is a successful call; only transport failures are errors

use async_trait::async_trait;
use url::Url;

use crate::dispatch::Adapter;
use crate::error::BoxError;
use crate::http::client::HOP_BY_HOP_HEADERS;
use crate::http::{HttpClient, RequestEnvelope, RequestOptions, ResponseTriple};

/// Forwards requests to `base_url`.
#[derive(Clone)]
pub struct UpstreamAdapter {
    name: String,
    base_url: Url,
    client: HttpClient,
}

impl UpstreamAdapter {
    pub fn new(name: impl Into<String>, base_url: &str, client: HttpClient) -> Result<Self, url::ParseError> {
        Ok(Self {
            name: name.into(),
            base_url: Url::parse(base_url)?,
            client,
        })
    }

    /// Backend URL for the request: base URL path joined with the request path and query.
    pub fn target_url(&self, request: &RequestEnvelope) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path_and_query()
        )
    }

    fn forward_options(request: &RequestEnvelope) -> RequestOptions {
        let mut options = RequestOptions::new().body(request.body.clone());
        for (name, value) in &request.headers {
            if !HOP_BY_HOP_HEADERS.contains(&name.as_str()) {
                options = options.header(name.clone(), value.clone());
            }
        }
        options
    }
}

#[async_trait]
impl Adapter for UpstreamAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, request: &RequestEnvelope) -> Result<ResponseTriple, BoxError> {
        let url = self.target_url(request);
        let response = self
            .client
            .make_request(request.method, &url, Self::forward_options(request))
            .await?;
        Ok(response)
    }
}
