//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional; missing values fall back to
//! the defaults for a BU-353-style GPS puck and the SDRuno power/SNR export.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{BeaconError, Result};

/// Baud rates accepted for NMEA receivers
const SUPPORTED_BAUD_RATES: &[u32] = &[4800, 9600, 19200, 38400, 57600, 115200];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub beacon: BeaconConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port discovery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    /// Device name template; `{n}` is the port number, `{i}` is `number - 1`
    #[serde(default = "default_port_template")]
    pub port_template: String,

    #[serde(default = "default_first_port")]
    pub first_port: u16,

    #[serde(default = "default_last_port")]
    pub last_port: u16,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Lines to read from the accepted port before giving up on a GPGGA sentence
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    #[serde(default = "default_verify_checksum")]
    pub verify_checksum: bool,
}

/// External telemetry CSV configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    /// Zero-based column holding the SNR in dB
    #[serde(default = "default_snr_column")]
    pub snr_column: usize,

    /// Rows shorter than this are treated as blank; the length excludes the
    /// line terminator
    #[serde(default = "default_min_row_length")]
    pub min_row_length: usize,
}

/// Beacon log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BeaconConfig {
    #[serde(default = "default_log_path")]
    pub log_path: String,

    #[serde(default = "default_beacon_format")]
    pub format: String,

    #[serde(default = "default_echo")]
    pub echo: bool,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily diagnostics file; empty disables it
    #[serde(default)]
    pub directory: String,
}

// Default value functions
#[cfg(windows)]
fn default_port_template() -> String { "COM{n}".to_string() }
#[cfg(not(windows))]
fn default_port_template() -> String { "/dev/ttyUSB{i}".to_string() }
fn default_first_port() -> u16 { 1 }
fn default_last_port() -> u16 { 10 }
fn default_baud_rate() -> u32 { 4800 }
fn default_timeout_ms() -> u64 { 1000 }
fn default_max_lines() -> usize { 100 }
fn default_verify_checksum() -> bool { true }

fn default_csv_path() -> String { "../SDRuno_PWRSNR.csv".to_string() }
fn default_snr_column() -> usize { 3 }
fn default_min_row_length() -> usize { 5 }

fn default_log_path() -> String { "beacon_data.txt".to_string() }
fn default_beacon_format() -> String { "csv".to_string() }
fn default_echo() -> bool { true }

fn default_log_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_template: default_port_template(),
            first_port: default_first_port(),
            last_port: default_last_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            max_lines: default_max_lines(),
            verify_checksum: default_verify_checksum(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            snr_column: default_snr_column(),
            min_row_length: default_min_row_length(),
        }
    }
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            format: default_beacon_format(),
            echo: default_echo(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
        }
    }
}

impl SerialConfig {
    /// Per-read timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn invalid(msg: impl std::fmt::Display) -> BeaconError {
    BeaconError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use beacon_logger::config::Config;
    ///
    /// let config = Config::load("beacon.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let serial = &self.serial;

        if !serial.port_template.contains("{n}") && !serial.port_template.contains("{i}") {
            return Err(invalid("port_template must contain {n} or {i}"));
        }

        if serial.first_port == 0 {
            return Err(invalid("first_port must be at least 1"));
        }

        if serial.first_port > serial.last_port {
            return Err(invalid("first_port must not exceed last_port"));
        }

        if !SUPPORTED_BAUD_RATES.contains(&serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {:?}",
                SUPPORTED_BAUD_RATES
            )));
        }

        if serial.timeout_ms == 0 || serial.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if serial.max_lines == 0 {
            return Err(invalid("max_lines must be greater than 0"));
        }

        if self.telemetry.csv_path.is_empty() {
            return Err(invalid("telemetry csv_path cannot be empty"));
        }

        if self.beacon.log_path.is_empty() {
            return Err(invalid("beacon log_path cannot be empty"));
        }

        if !["csv", "jsonl"].contains(&self.beacon.format.as_str()) {
            return Err(invalid("beacon format must be 'csv' or 'jsonl'"));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(format!(
                "unknown logging level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}
