//! Logger configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file,
//! then command-line overrides. [`LoggerConfig::validate`] runs once on
//! the merged result, before any port is opened.

use crate::error::{LoggerError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default output file, truncated at the start of every run
pub const DEFAULT_OUTPUT: &str = "serial_output.txt";

/// Default baud rate (Arduino-style sketches)
pub const DEFAULT_BAUD: u32 = 9600;

/// Default read timeout between stop-flag checks
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM3";
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Fully resolved logger settings
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    /// Serial port identifier (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// Baud rate, must match the device
    pub baud_rate: u32,
    /// Output file path
    pub output: PathBuf,
    /// How long a single read may block before the stop flag is re-checked
    pub read_timeout: Duration,
    /// Prefix each record with a local timestamp
    pub timestamps: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD,
            output: PathBuf::from(DEFAULT_OUTPUT),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            timestamps: false,
        }
    }
}

/// On-disk form. Every key is optional and only overrides what it names.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub output: Option<PathBuf>,
    pub read_timeout_ms: Option<u64>,
    pub timestamps: Option<bool>,
}

impl ConfigFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LoggerError::config("config", format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LoggerError::config("config", e.to_string()))
    }
}

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub output: Option<PathBuf>,
    pub read_timeout_ms: Option<u64>,
    pub timestamps: Option<bool>,
}

impl LoggerConfig {
    /// Apply a parsed config file on top of the current values
    pub fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(baud) = file.baud_rate {
            self.baud_rate = baud;
        }
        if let Some(output) = file.output {
            self.output = output;
        }
        if let Some(ms) = file.read_timeout_ms {
            self.read_timeout = Duration::from_millis(ms);
        }
        if let Some(timestamps) = file.timestamps {
            self.timestamps = timestamps;
        }
        self
    }

    /// Apply command-line overrides on top of the current values
    pub fn merge_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(baud) = overrides.baud_rate {
            self.baud_rate = baud;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(ms) = overrides.read_timeout_ms {
            self.read_timeout = Duration::from_millis(ms);
        }
        if let Some(timestamps) = overrides.timestamps {
            self.timestamps = timestamps;
        }
        self
    }

    /// Defaults, then `config_path` if given, then `overrides`
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = config_path {
            log::debug!("Loading configuration from {}", path.display());
            config = config.merge_file(ConfigFile::from_file(path)?);
        }
        let config = config.merge_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(LoggerError::config("port", "port cannot be empty"));
        }
        if self.baud_rate == 0 {
            return Err(LoggerError::config("baud_rate", "must be greater than 0"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(LoggerError::config("output", "path cannot be empty"));
        }
        if self.read_timeout.is_zero() {
            return Err(LoggerError::config(
                "read_timeout_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}
