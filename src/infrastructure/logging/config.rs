use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::models::LoggingConfig;

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format for the terminal layer (json, pretty)
    pub format: LogFormat,

    /// Directory for the log file (optional, if None logs only to the terminal)
    pub log_dir: Option<PathBuf>,

    /// File name inside `log_dir`; the file is appended to, never rotated
    pub file_name: String,

    /// Enable terminal logging
    pub enable_stdout: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("Invalid log format: {other}")),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from(&LoggingConfig::default())
    }
}

impl From<&LoggingConfig> for LogConfig {
    /// Unknown formats fall back to pretty; `ConfigLoader::validate` rejects
    /// them before this conversion runs.
    fn from(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            format: config.format.parse().unwrap_or(LogFormat::Pretty),
            log_dir: config.log_dir.clone(),
            file_name: config.file_name.clone(),
            enable_stdout: config.enable_stdout,
        }
    }
}
