use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::models::LoggingConfig;

/// Validated logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: LogLevel,

    /// Output format for stderr
    pub format: LogFormat,

    /// Directory for an additional JSON log file
    pub log_dir: Option<PathBuf>,

    /// Log file rotation policy
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// A logging setting that names no known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {setting} '{value}' (expected one of: {expected})")]
pub struct InvalidLogSetting {
    pub setting: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl FromStr for LogLevel {
    type Err = InvalidLogSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(InvalidLogSetting {
                setting: "log level",
                value: s.to_string(),
                expected: "trace, debug, info, warn, error",
            }),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

impl FromStr for LogFormat {
    type Err = InvalidLogSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(InvalidLogSetting {
                setting: "log format",
                value: s.to_string(),
                expected: "json, pretty",
            }),
        }
    }
}

impl FromStr for RotationPolicy {
    type Err = InvalidLogSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "hourly" => Ok(Self::Hourly),
            "never" => Ok(Self::Never),
            _ => Err(InvalidLogSetting {
                setting: "log rotation",
                value: s.to_string(),
                expected: "daily, hourly, never",
            }),
        }
    }
}

impl TryFrom<&LoggingConfig> for LogConfig {
    type Error = InvalidLogSetting;

    fn try_from(config: &LoggingConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            level: config.level.parse()?,
            format: config.format.parse()?,
            log_dir: config.log_dir.as_ref().map(PathBuf::from),
            rotation: config.rotation.parse()?,
        })
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}
