//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → owned by Service, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table depends on it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AuthConfig, DispatcherConfig, FormatterConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ServiceConfig, TimeoutConfig,
};
