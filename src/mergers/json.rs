//! JSON merger composing one document from all adapter responses.
//!
//! # Strategies
//! - `keyed`: `{ "<adapter name>": <body> }` for every adapter
//! - `combined`: shallow merge of every JSON object body, later adapter names win
//!
//! # Design Decisions
//! - Bodies that are not JSON are embedded as strings (`keyed`) or skipped (`combined`)
//! - The merged status is the highest status seen, so backend errors are not masked
//! - Adapters are visited in name order to keep output deterministic

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dispatch::{Merger, ResponseCollection};
use crate::error::BoxError;
use crate::http::{RequestEnvelope, ResponseTriple};

/// How adapter bodies are folded into the merged document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    #[default]
    Keyed,
    Combined,
}

#[derive(Debug, Clone)]
pub struct JsonMerger {
    name: String,
    strategy: MergeStrategy,
}

impl JsonMerger {
    pub fn new(name: impl Into<String>, strategy: MergeStrategy) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }

    fn compose(&self, responses: &ResponseCollection) -> (u16, Value) {
        let mut status = 200;
        let mut document = Map::new();

        for (adapter, triples) in responses.sorted_by_name() {
            for triple in triples {
                status = status.max(triple.status);
                let parsed = serde_json::from_str::<Value>(&triple.body);

                match self.strategy {
                    MergeStrategy::Keyed => {
                        let value = parsed.unwrap_or_else(|_| Value::String(triple.body.clone()));
                        document.insert(adapter.name().to_string(), value);
                    }
                    MergeStrategy::Combined => match parsed {
                        Ok(Value::Object(fields)) => document.extend(fields),
                        _ => tracing::debug!(
                            adapter = adapter.name(),
                            "Skipping non-object body in combined merge"
                        ),
                    },
                }
            }
        }

        (status, Value::Object(document))
    }
}

#[async_trait]
impl Merger for JsonMerger {
    fn name(&self) -> &str {
        &self.name
    }

    async fn merge(
        &self,
        _request: &RequestEnvelope,
        responses: ResponseCollection,
    ) -> Result<ResponseTriple, BoxError> {
        let (status, document) = self.compose(&responses);
        let body = serde_json::to_string(&document)?;
        Ok(ResponseTriple::new(status, body).with_header("content-type", "application/json"))
    }
}
