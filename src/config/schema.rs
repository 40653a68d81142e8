//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the composer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::dispatch::FailurePolicy;
use crate::mergers::MergeStrategy;
use crate::routing::Method;

/// Root configuration for the composer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ComposerConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Outbound HTTP timeouts.
    pub timeouts: TimeoutConfig,

    /// Fan-out behaviour.
    pub fan_out: FanOutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Adapter registrations, applied in order.
    pub adapters: Vec<AdapterConfig>,

    /// Merger registrations, applied in order. Order decides precedence.
    pub mergers: Vec<MergerConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest inbound request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeouts applied to every outbound backend call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Maximum silence from the backend (response head or body) in seconds.
    pub inactivity_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            inactivity_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FanOutConfig {
    /// What to do with in-flight adapters once one fails.
    pub on_failure: FailurePolicy,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// An upstream adapter bound to a route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdapterConfig {
    /// Adapter name, used as the key in merged documents.
    pub name: String,

    /// Route pattern (regular expression, unanchored).
    pub route: String,

    /// Methods to register under; empty means all.
    #[serde(default)]
    pub methods: Vec<Method>,

    /// Backend base URL the request is forwarded to.
    pub upstream: String,
}

/// A merger bound to a route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MergerConfig {
    pub name: String,

    /// Route pattern (regular expression, unanchored).
    pub route: String,

    #[serde(default)]
    pub methods: Vec<Method>,

    #[serde(default)]
    pub strategy: MergeStrategy,
}
