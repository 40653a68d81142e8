//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check registrations (unique names, compilable routes, usable upstreams)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ComposerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ComposerConfig;
use crate::routing::RoutePattern;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} '{name}' has an invalid route '{route}': {reason}")]
    InvalidRoute {
        kind: &'static str,
        name: String,
        route: String,
        reason: String,
    },

    #[error("adapter '{name}' has an invalid upstream '{upstream}': {reason}")]
    InvalidUpstream {
        name: String,
        upstream: String,
        reason: String,
    },
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ComposerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "timeouts.connect_secs",
        });
    }
    if config.timeouts.inactivity_secs == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "timeouts.inactivity_secs",
        });
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "listener.max_body_bytes",
        });
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let mut names = HashSet::new();
    for adapter in &config.adapters {
        if !names.insert(adapter.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                kind: "adapter",
                name: adapter.name.clone(),
            });
        }
        check_route(&mut errors, "adapter", &adapter.name, &adapter.route);
        if let Err(reason) = check_upstream(&adapter.upstream) {
            errors.push(ValidationError::InvalidUpstream {
                name: adapter.name.clone(),
                upstream: adapter.upstream.clone(),
                reason,
            });
        }
    }

    let mut names = HashSet::new();
    for merger in &config.mergers {
        if !names.insert(merger.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                kind: "merger",
                name: merger.name.clone(),
            });
        }
        check_route(&mut errors, "merger", &merger.name, &merger.route);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_route(errors: &mut Vec<ValidationError>, kind: &'static str, name: &str, route: &str) {
    if let Err(e) = RoutePattern::regex(route) {
        errors.push(ValidationError::InvalidRoute {
            kind,
            name: name.to_string(),
            route: route.to_string(),
            reason: e.to_string(),
        });
    }
}

/// The outbound client speaks plain HTTP only.
fn check_upstream(upstream: &str) -> Result<(), String> {
    let url = Url::parse(upstream).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{AdapterConfig, MergerConfig};
    use crate::mergers::MergeStrategy;

    fn adapter(name: &str, route: &str, upstream: &str) -> AdapterConfig {
        AdapterConfig {
            name: name.into(),
            route: route.into(),
            methods: Vec::new(),
            upstream: upstream.into(),
        }
    }

    fn merger(name: &str, route: &str) -> MergerConfig {
        MergerConfig {
            name: name.into(),
            route: route.into(),
            methods: Vec::new(),
            strategy: MergeStrategy::Keyed,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ComposerConfig::default()).is_ok());
    }

    #[test]
    fn test_registrations_valid() {
        let mut config = ComposerConfig::default();
        config.adapters.push(adapter("users", "^/users", "http://127.0.0.1:3001"));
        config.adapters.push(adapter("orders", "^/users", "http://orders.internal/v1"));
        config.mergers.push(merger("users", "^/users"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ComposerConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.adapters.push(adapter("users", "(", "http://127.0.0.1:3001"));
        config.adapters.push(adapter("users", "^/users", "https://secure.internal"));
        config.mergers.push(merger("m", "["));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::DuplicateName {
            kind: "adapter",
            name: "users".into()
        }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUpstream { upstream, .. } if upstream.starts_with("https"))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidRoute { kind: "merger", .. })));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ComposerConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(validate_config(&config).unwrap_err().len(), 1);
    }
}
