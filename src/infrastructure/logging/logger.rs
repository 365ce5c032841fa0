use super::config::{LogConfig, LogFormat, RotationPolicy};
use anyhow::{Context, Result};
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// File name used inside `log_dir`
pub const LOG_FILE_NAME: &str = "cachefront.log";

/// Logger implementation using tracing
///
/// Diagnostics always go to stderr so stdout carries only command output.
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Install the global subscriber
    ///
    /// # Errors
    /// Returns an error if a global subscriber is already installed
    pub fn init(config: &LogConfig) -> Result<Self> {
        let filter = build_filter(config.level.into(), std::env::var_os("RUST_LOG").is_some())?;

        let stderr_layer = match config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_span_list(false)
                .with_target(true)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_writer(io::stderr)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .boxed(),
        };

        let (file_layer, guard) = match config.log_dir {
            Some(ref log_dir) => {
                let appender = match config.rotation {
                    RotationPolicy::Daily => rolling::daily(log_dir, LOG_FILE_NAME),
                    RotationPolicy::Hourly => rolling::hourly(log_dir, LOG_FILE_NAME),
                    RotationPolicy::Never => rolling::never(log_dir, LOG_FILE_NAME),
                };
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                // File output is always JSON
                let layer = fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .context("failed to install tracing subscriber")?;

        tracing::debug!(
            level = ?config.level,
            format = ?config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }
}

/// Filter with `default_level` unless `RUST_LOG` overrides it.
///
/// sqlx logs every statement at info, so it is capped at warn unless the
/// user asked for something else.
fn build_filter(default_level: Level, rust_log_set: bool) -> Result<EnvFilter> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    if rust_log_set {
        return Ok(filter);
    }
    let quiet_sqlx: Directive = "sqlx=warn".parse().context("invalid sqlx directive")?;
    Ok(filter.add_directive(quiet_sqlx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::config::LogLevel;

    #[test]
    fn test_build_filter_caps_sqlx() {
        let filter = build_filter(Level::DEBUG, false).unwrap();
        assert!(filter.to_string().contains("sqlx=warn"));
    }

    #[test]
    fn test_logger_init_once() {
        let config = LogConfig {
            level: LogLevel::Warn,
            ..LogConfig::default()
        };

        assert!(LoggerImpl::init(&config).is_ok());
        // The global subscriber can only be set once per process
        assert!(LoggerImpl::init(&config).is_err());
    }
}
