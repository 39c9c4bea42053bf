//! # Error Types
//!
//! Custom error types for Beacon Logger using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Beacon Logger
#[derive(Debug, Error)]
pub enum BeaconError {
    /// No candidate serial port opened and produced data
    #[error("No GPS receiver found on serial ports {first} through {last}")]
    PortExhaustion { first: u16, last: u16 },

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// The accepted port never produced a GPGGA sentence
    #[error("No GPGGA sentence received: {0}")]
    NoFixSentence(String),

    /// NMEA sentence errors
    #[error("Malformed GPGGA sentence: {0}")]
    MalformedSentence(String),

    /// Coordinate field does not match the NMEA fixed-width layout
    #[error("Malformed coordinate field: {0}")]
    MalformedCoordinate(String),

    /// Telemetry CSV could not be opened or read
    #[error("Telemetry source {} is not readable: {source}", .path.display())]
    UnreadableTelemetrySource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Telemetry CSV holds no data row
    #[error("Telemetry source has no data rows: {0}")]
    EmptyTelemetrySource(String),

    /// Telemetry row could not be interpreted
    #[error("Malformed telemetry row: {0}")]
    MalformedTelemetry(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Diagnostics log file could not be opened
    #[error("Diagnostics log error: {0}")]
    DiagnosticsLog(#[from] tracing_appender::rolling::InitError),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BeaconError {
    /// Whether the error came from reading the telemetry CSV.
    ///
    /// These failures skip the beacon write instead of aborting the run.
    pub fn is_telemetry(&self) -> bool {
        matches!(
            self,
            BeaconError::UnreadableTelemetrySource { .. }
                | BeaconError::EmptyTelemetrySource(_)
                | BeaconError::MalformedTelemetry(_)
        )
    }
}

/// Result type alias for Beacon Logger
pub type Result<T> = std::result::Result<T, BeaconError>;
