//! Infrastructure layer module
//!
//! Process-wide concerns that sit outside the fetch path:
//! - Configuration management
//! - Logging infrastructure
//!
//! Both run once at startup; the resulting values are passed into the
//! adapters and services.

pub mod config;
pub mod logging;
