//! Service configuration loaded from a TOML file.
//!
//! ```toml
//! [logging]
//! level = "debug"              # debug | info | warn | error
//! file = "wq_mission.log"      # optional
//! console_timestamps = true
//! ```
//!
//! Every section and key is optional; missing values take the defaults
//! below. The mission id prefix is not configurable.

use serde::Deserialize;
use std::fs;

use crate::logging::{self, Component, LogLevel};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            console_timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub logging: LoggingConfig,
}

/// Errors that can arise when loading or applying configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(String),
    /// The file was read but is not valid TOML for this schema.
    Parse(String),
    /// `logging.level` names no known level.
    UnknownLogLevel(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::UnknownLogLevel(level) => write!(f, "Unknown log level: {}", level),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServiceConfig {
    /// The configured minimum log level.
    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        LogLevel::from_name(&self.logging.level)
            .ok_or_else(|| ConfigError::UnknownLogLevel(self.logging.level.clone()))
    }

    /// Installs the global logger described by this config.
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        let level = self.log_level()?;
        logging::init_logger(level, self.logging.file.as_deref(), self.logging.console_timestamps);
        logging::info(Component::Config, None, &format!("logger initialized at {}", level));
        Ok(())
    }
}

/// Parses config text.
pub fn parse_config(text: &str) -> Result<ServiceConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Reads and parses a config file. Failures are logged through any
/// logger already installed.
pub fn load_config(path: &str) -> Result<ServiceConfig, ConfigError> {
    let result = fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))
        .and_then(|text| parse_config(&text));
    if let Err(ref e) = result {
        logging::error(Component::Config, Some(path), &e.to_string());
    }
    result
}
