use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::Config;
use crate::infrastructure::logging::{scrub_secrets, InvalidLogSetting, LogConfig};

/// Project config file read when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = ".cachefront/config.yaml";

/// Prefix for nested environment overrides, e.g. `CACHEFRONT_STORE__HOST`
pub const ENV_PREFIX: &str = "CACHEFRONT_";

/// Environment variable names understood for compatibility with older
/// deployments, and the config key each one sets.
pub const LEGACY_ENV_VARS: &[(&str, &str)] = &[
    ("REDIS_HOST", "store.host"),
    ("REDIS_PORT", "store.port"),
    ("REDIS_DB", "store.database"),
    ("PG_HOST", "source.host"),
    ("PG_DBNAME", "source.database"),
    ("PG_USER", "source.user"),
    ("PG_PASSWORD", "source.password"),
];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingField(&'static str),

    #[error("Invalid cache.ttl_secs: {0}. Must be at least 1")]
    InvalidTtl(u64),

    #[error("Unsupported source.url '{0}'. Expected postgres://, postgresql:// or sqlite:")]
    UnsupportedSourceUrl(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(#[from] InvalidLogSetting),

    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
}

/// Overrides taken from the command line, merged last
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub ttl_secs: Option<u64>,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `path`, or `.cachefront/config.yaml` when present
    /// 3. Legacy environment variables (`REDIS_HOST`, `PG_USER`, ...)
    /// 4. `CACHEFRONT_*` environment variables
    /// 5. Command-line overrides
    ///
    /// # Errors
    /// `ConfigError::FileNotFound` if an explicit `path` does not exist, any
    /// other `ConfigError` if extraction or validation fails.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
        }

        let config = Self::extract(Self::figment(path, overrides))?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Build the layered figment without extracting it
    pub fn figment(path: Option<&Path>, overrides: &ConfigOverrides) -> Figment {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), Path::to_path_buf);

        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(legacy_env())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(ttl_secs) = overrides.ttl_secs {
            figment = figment.merge(Serialized::default("cache.ttl_secs", ttl_secs));
        }
        figment
    }

    /// Extract a `Config` from `figment`
    pub fn extract(figment: Figment) -> Result<Config, ConfigError> {
        figment.extract().map_err(|e| ConfigError::Extract(Box::new(e)))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if is_blank(config.store.host.as_deref()) {
            return Err(ConfigError::MissingField("store.host"));
        }

        let source = &config.source;
        match source.url.as_deref() {
            Some(url) if source.driver().is_none() => {
                return Err(ConfigError::UnsupportedSourceUrl(scrub_secrets(url)));
            }
            Some(_) => {}
            None => {
                let required = [
                    ("source.host", &source.host),
                    ("source.database", &source.database),
                    ("source.user", &source.user),
                    ("source.password", &source.password),
                ];
                if let Some((name, _)) = required.iter().find(|(_, v)| is_blank(v.as_deref())) {
                    return Err(ConfigError::MissingField(*name));
                }
            }
        }

        if config.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl(config.cache.ttl_secs));
        }

        LogConfig::try_from(&config.logging)?;
        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn legacy_env() -> Env {
    let names: Vec<&str> = LEGACY_ENV_VARS.iter().map(|(var, _)| *var).collect();
    Env::raw().only(&names).map(|key| {
        LEGACY_ENV_VARS
            .iter()
            .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
            .map_or_else(|| key.into(), |(_, path)| (*path).into())
    })
}
