//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use output::{handle_error, output, CommandOutput, ErrorOutput};
pub use types::Cli;

use crate::domain::errors::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::infrastructure::config::{ConfigLoader, ConfigOverrides};
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

/// Load configuration, start logging, and run the fetch.
///
/// Returns the process exit code.
pub async fn run(cli: Cli) -> i32 {
    let overrides = ConfigOverrides {
        ttl_secs: cli.fetch.ttl,
    };
    let config = match ConfigLoader::load(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(err) => {
            let _logger = fallback_logger();
            return handle_error(&err.into(), cli.json);
        }
    };

    let logger = LogConfig::try_from(&config.logging)
        .map_err(anyhow::Error::from)
        .and_then(|log_config| LoggerImpl::init(&log_config));
    let _logger = match logger {
        Ok(logger) => logger,
        Err(err) => {
            let _logger = fallback_logger();
            return handle_error(&err, cli.json);
        }
    };

    match commands::fetch::execute(cli.fetch, &config, cli.json).await {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => handle_error(&err, cli.json),
    }
}

/// Stderr logger with default settings, for failures before the configured
/// logger exists. `None` if a subscriber is already installed.
fn fallback_logger() -> Option<LoggerImpl> {
    LoggerImpl::init(&LogConfig::default()).ok()
}

/// Exit code for a command-line parse failure.
///
/// Help and version requests are not failures.
pub fn parse_error_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        EXIT_CONFIG
    } else {
        EXIT_SUCCESS
    }
}
