//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Legacy and prefixed environment variable overrides
//! - Command-line overrides
//! - Validation of required connection settings

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, ConfigOverrides, DEFAULT_CONFIG_PATH};
