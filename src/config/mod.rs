//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ComposerConfig (validated, immutable)
//!     → lifecycle::startup builds the registry from it
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the registry it produces never changes
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdapterConfig, ComposerConfig, FanOutConfig, ListenerConfig, MergerConfig, ObservabilityConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
