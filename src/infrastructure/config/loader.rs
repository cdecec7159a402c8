use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::infrastructure::logging::LogFormat;

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Invalid inference.dimensions: {0}. Must be at least 1")]
    InvalidDimensions(usize),

    #[error("Invalid inference.max_tokens_per_item: {0}. Must be at least 1")]
    InvalidMaxTokens(usize),

    #[error("Invalid inference.timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid pipeline.batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    #[error("Invalid {field}: '{value}'. Must start with a letter and contain only letters, digits and underscores")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("Invalid retry backoff: {0}. Must be a finite, non-negative number of seconds")]
    InvalidBackoff(String),

    #[error("Invalid retry status: {0}. Must be between 100 and 599")]
    InvalidRetryStatus(u16),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Project directory holding optional config files
pub const CONFIG_DIR: &str = ".codembed";

/// Prefix of environment overrides, e.g. `CODEMBED_GRAPH__URI`
pub const ENV_PREFIX: &str = "CODEMBED_";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `config_file`, or .codembed/config.yaml when none is given
    /// 3. .codembed/local.yaml (local overrides, optional)
    /// 4. Environment variables (`CODEMBED_*` prefix, `__` separates sections)
    /// 5. `overrides` (command-line flags); `None` fields are skipped
    pub fn load<O: Serialize>(config_file: Option<&Path>, overrides: &O) -> Result<Config> {
        let default_file = Path::new(CONFIG_DIR).join("config.yaml");
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(config_file.unwrap_or(&default_file)))
            .merge(Yaml::file(Path::new(CONFIG_DIR).join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Required settings
        require(&config.inference.url, "inference.url")?;
        require(&config.inference.token, "inference.token")?;
        require(&config.graph.uri, "graph.uri")?;
        require(&config.graph.user, "graph.user")?;
        require(&config.graph.password, "graph.password")?;

        if config.inference.dimensions == 0 {
            return Err(ConfigError::InvalidDimensions(config.inference.dimensions));
        }
        if config.inference.max_tokens_per_item == 0 {
            return Err(ConfigError::InvalidMaxTokens(
                config.inference.max_tokens_per_item,
            ));
        }
        if config.inference.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.inference.timeout_secs));
        }

        if config.pipeline.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(config.pipeline.batch_size));
        }

        // Names interpolated into Cypher
        identifier(&config.graph.label, "graph.label")?;
        identifier(&config.graph.text_property, "graph.text_property")?;
        identifier(&config.graph.embedding_property, "graph.embedding_property")?;
        identifier(&config.graph.index_name, "graph.index_name")?;

        // Retry config
        for secs in [config.retry.backoff_factor_secs, config.retry.max_backoff_secs] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ConfigError::InvalidBackoff(secs.to_string()));
            }
        }
        if let Some(status) = config
            .retry
            .retry_statuses
            .iter()
            .find(|status| !(100..=599).contains(*status))
        {
            return Err(ConfigError::InvalidRetryStatus(*status));
        }

        // Logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if config.logging.format.parse::<LogFormat>().is_err() {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField(field));
    }
    Ok(())
}

/// Accepts `[A-Za-z][A-Za-z0-9_]*`
fn identifier(value: &str, field: &'static str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}
