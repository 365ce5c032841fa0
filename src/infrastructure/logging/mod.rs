//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber, written to stderr
//! with an optional rotating JSON file, plus credential scrubbing for
//! connection strings and driver errors.

pub mod config;
pub mod logger;
pub mod secret_scrubbing;

pub use config::{InvalidLogSetting, LogConfig, LogFormat, LogLevel, RotationPolicy};
pub use logger::LoggerImpl;
pub use secret_scrubbing::{scrub_secrets, SecretScrubber};
