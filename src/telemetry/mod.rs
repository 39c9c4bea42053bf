//! # Telemetry Module
//!
//! Reads the latest sample from the externally written SDR power/SNR CSV.
//!
//! This module handles:
//! - Skipping the CSV header
//! - Selecting the last data row (rows shorter than 5 characters count as blank)
//! - Extracting the SNR column and deriving the noise weight
//!
//! The CSV is owned by another program and is only ever read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::config::TelemetryConfig;
use crate::error::{BeaconError, Result};

/// Multiplier applied to the SNR to obtain the noise weight
pub const SNR_WEIGHT_FACTOR: f64 = -10.0;

/// Noise weight for an SNR reading in dB
///
/// # Examples
///
/// ```
/// use beacon_logger::telemetry::snr_weight;
///
/// assert_eq!(snr_weight(1.0), -10.0);
/// assert_eq!(snr_weight(-5.0), 50.0);
/// ```
pub fn snr_weight(snr_db: f64) -> f64 {
    snr_db * SNR_WEIGHT_FACTOR
}

/// Latest row of the telemetry CSV
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    /// Row text with the line terminator stripped
    pub raw: String,
    pub snr_db: f64,
    pub snr_weight: f64,
}

impl TelemetrySample {
    /// Comma-separated fields of the row: timestamp, frequency (Hz),
    /// power (dB), SNR (dB)
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.raw.split(',').map(str::trim)
    }
}

/// Reads samples using a configured column layout
#[derive(Debug, Clone)]
pub struct TelemetryCorrelator {
    snr_column: usize,
    min_row_length: usize,
}

impl Default for TelemetryCorrelator {
    fn default() -> Self {
        Self::from(&TelemetryConfig::default())
    }
}

impl From<&TelemetryConfig> for TelemetryCorrelator {
    fn from(config: &TelemetryConfig) -> Self {
        Self {
            snr_column: config.snr_column,
            min_row_length: config.min_row_length,
        }
    }
}

impl TelemetryCorrelator {
    /// Read the most recent sample from the CSV at `path`
    ///
    /// # Errors
    ///
    /// - `UnreadableTelemetrySource`: the file cannot be opened or read
    /// - `EmptyTelemetrySource`: no data row follows the header
    /// - `MalformedTelemetry`: the SNR column is missing or not a number
    pub fn read_latest_sample<P: AsRef<Path>>(&self, path: P) -> Result<TelemetrySample> {
        let path = path.as_ref();
        let unreadable = |source: std::io::Error| BeaconError::UnreadableTelemetrySource {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unreadable)?;
        let mut lines = BufReader::new(file).lines();

        // Header
        lines.next().transpose().map_err(unreadable)?;

        let mut latest = None;
        for line in lines {
            let line = line.map_err(unreadable)?;
            let row = line.trim_end_matches('\r');
            if row.len() >= self.min_row_length {
                latest = Some(row.to_string());
            }
        }

        let raw = latest
            .ok_or_else(|| BeaconError::EmptyTelemetrySource(path.display().to_string()))?;
        debug!("Latest telemetry row: {}", raw);
        self.parse_row(raw)
    }

    fn parse_row(&self, raw: String) -> Result<TelemetrySample> {
        let field = raw.split(',').nth(self.snr_column).ok_or_else(|| {
            BeaconError::MalformedTelemetry(format!(
                "row '{}' has no SNR column {}",
                raw, self.snr_column
            ))
        })?;

        let snr_db: f64 = field.trim().parse().map_err(|_| {
            BeaconError::MalformedTelemetry(format!("SNR '{}' is not a number", field.trim()))
        })?;

        Ok(TelemetrySample {
            snr_weight: snr_weight(snr_db),
            snr_db,
            raw,
        })
    }
}

/// Read the most recent sample using the default column layout
pub fn read_latest_sample<P: AsRef<Path>>(path: P) -> Result<TelemetrySample> {
    TelemetryCorrelator::default().read_latest_sample(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_snr_weight() {
        assert_eq!(snr_weight(1.0), -10.0);
        assert_eq!(snr_weight(-5.0), 50.0);
        assert_eq!(snr_weight(0.0), 0.0);
    }

    #[test]
    fn test_last_row_selected_over_trailing_blank() {
        let file = csv(
            "Time,Hz,dB,SNR\n\
             15:56:11,14240000,-117.0,0.5\n\
             15:56:13,14240000,-116.5,1.0\n\
             \n",
        );

        let sample = read_latest_sample(file.path()).unwrap();
        assert_eq!(sample.raw, "15:56:13,14240000,-116.5,1.0");
        assert_eq!(sample.snr_db, 1.0);
        assert_eq!(sample.snr_weight, -10.0);
    }

    #[test]
    fn test_short_rows_between_data_are_skipped() {
        let file = csv("h\na,b,c,2.0\n,,\nd,e,f,-5.0\n  \n");

        let sample = read_latest_sample(file.path()).unwrap();
        assert_eq!(sample.raw, "d,e,f,-5.0");
        assert_eq!(sample.snr_weight, 50.0);
    }

    #[test]
    fn test_row_length_excludes_terminator() {
        let file = csv("h\na,b,c,1.0\n1234\n12345\r\n");
        let sample = TelemetryCorrelator::from(&TelemetryConfig {
            snr_column: 0,
            ..TelemetryConfig::default()
        })
        .read_latest_sample(file.path())
        .unwrap();
        assert_eq!(sample.raw, "12345");

        let file = csv("h\na,b,c,1.0\n1234\n");
        let sample = read_latest_sample(file.path()).unwrap();
        assert_eq!(sample.raw, "a,b,c,1.0");
    }

    #[test]
    fn test_crlf_rows() {
        let file = csv("Time,Hz,dB,SNR\r\n15:56:13,14240000,-116.5,1.0\r\n\r\n");

        let sample = read_latest_sample(file.path()).unwrap();
        assert_eq!(sample.raw, "15:56:13,14240000,-116.5,1.0");
    }

    #[test]
    fn test_fields() {
        let file = csv("header\n15:56:13, 14240000, -116.5, 1.0\n");

        let sample = read_latest_sample(file.path()).unwrap();
        let fields: Vec<_> = sample.fields().collect();
        assert_eq!(fields, ["15:56:13", "14240000", "-116.5", "1.0"]);
    }

    #[test]
    fn test_configured_snr_column() {
        let file = csv("freq,power,snr\n14240000,-116.5,1.0\n");
        let correlator = TelemetryCorrelator::from(&TelemetryConfig {
            snr_column: 2,
            ..TelemetryConfig::default()
        });

        let sample = correlator.read_latest_sample(file.path()).unwrap();
        assert_eq!(sample.raw, "14240000,-116.5,1.0");
        assert_eq!(sample.snr_weight, -10.0);
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_latest_sample(dir.path().join("SDRuno_PWRSNR.csv"));

        match result {
            Err(err @ BeaconError::UnreadableTelemetrySource { .. }) => {
                assert!(err.is_telemetry());
                assert!(err.to_string().contains("SDRuno_PWRSNR.csv"));
            }
            other => panic!("Expected UnreadableTelemetrySource, got: {:?}", other),
        }
    }

    #[test]
    fn test_header_only() {
        let file = csv("Time,Hz,dB,SNR\n\n");
        let result = read_latest_sample(file.path());
        assert!(matches!(result, Err(BeaconError::EmptyTelemetrySource(_))));
    }

    #[test]
    fn test_missing_snr_column() {
        let file = csv("freq,power,snr\n14240000,-116.5,1.0\n");
        let result = read_latest_sample(file.path());
        assert!(matches!(result, Err(BeaconError::MalformedTelemetry(_))));
    }

    #[test]
    fn test_non_numeric_snr() {
        let file = csv("h\na,b,c,strong\n");
        match read_latest_sample(file.path()) {
            Err(BeaconError::MalformedTelemetry(msg)) => assert!(msg.contains("strong")),
            other => panic!("Expected MalformedTelemetry, got: {:?}", other),
        }
    }
}
