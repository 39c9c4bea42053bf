//! # Beacon Log
//!
//! Appends one record per invocation combining the GPS fix with the latest
//! telemetry sample.
//!
//! ## Record Format
//!
//! The default `csv` format writes
//!
//! ```text
//! 4744.00N,12219.73W, 47.7333,-122.3288, 14240000,-116.5,1.0, -10.0
//! ```
//!
//! that is: NMEA coordinates with hemisphere suffixes, decimal degrees, the
//! telemetry row verbatim, and the noise weight. The `jsonl` format writes
//! the same values as one JSON object per line, together with the time the
//! record was written and the GPS fix time.

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::BeaconConfig;
use crate::error::{BeaconError, Result};
use crate::nmea::coordinate::{DecimalDegreePair, DmsCoordinatePair};
use crate::telemetry::TelemetrySample;

/// Output encoding of the beacon log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconFormat {
    Csv,
    JsonLines,
}

impl std::str::FromStr for BeaconFormat {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(BeaconFormat::Csv),
            "jsonl" => Ok(BeaconFormat::JsonLines),
            other => Err(BeaconError::Config(serde::de::Error::custom(format!(
                "unknown beacon format '{}'",
                other
            )))),
        }
    }
}

/// One correlated position/telemetry record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeaconRecord {
    /// `"{lat}{N|S},{lon}{E|W}"`
    pub dms: String,
    pub latitude: f64,
    pub longitude: f64,
    pub telemetry: String,
    pub snr_weight: f64,
    /// GPS fix time (UTC time of day)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_time: Option<NaiveTime>,
    pub recorded_at: DateTime<Utc>,
}

impl BeaconRecord {
    pub fn new(
        dms: &DmsCoordinatePair,
        dd: DecimalDegreePair,
        sample: &TelemetrySample,
        fix_time: Option<NaiveTime>,
    ) -> Self {
        Self {
            dms: dms.to_string(),
            latitude: dd.latitude,
            longitude: dd.longitude,
            telemetry: sample.raw.clone(),
            snr_weight: sample.snr_weight,
            fix_time,
            recorded_at: Utc::now(),
        }
    }

    /// Record as a newline-terminated line in `format`
    pub fn to_line(&self, format: BeaconFormat) -> Result<String> {
        match format {
            BeaconFormat::Csv => Ok(format!("{}\n", self)),
            BeaconFormat::JsonLines => Ok(format!("{}\n", serde_json::to_string(self)?)),
        }
    }
}

impl fmt::Display for BeaconRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dd = DecimalDegreePair {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        write!(
            f,
            "{}, {}, {}, {:?}",
            self.dms,
            dd,
            self.telemetry.trim_end_matches(['\r', '\n']),
            self.snr_weight
        )
    }
}

/// Result of an append attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    /// The record was appended to the beacon log
    Written(BeaconRecord),
    /// Telemetry was unavailable; nothing was written
    Skipped { reason: String },
}

impl AppendOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, AppendOutcome::Written(_))
    }
}

/// Append-only writer for the beacon log
#[derive(Debug, Clone)]
pub struct BeaconLogger {
    path: PathBuf,
    format: BeaconFormat,
    echo: bool,
}

impl BeaconLogger {
    pub fn new(path: impl Into<PathBuf>, format: BeaconFormat) -> Self {
        Self {
            path: path.into(),
            format,
            echo: true,
        }
    }

    /// Build a logger from the `[beacon]` configuration section
    ///
    /// # Errors
    ///
    /// Returns `Config` if the format name is unknown
    pub fn from_config(config: &BeaconConfig) -> Result<Self> {
        Ok(Self::new(&config.log_path, config.format.parse()?).with_echo(config.echo))
    }

    /// Print each written record to stdout
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append the fix correlated with `sample`
    ///
    /// A failed telemetry read produces `Skipped` and leaves the log
    /// untouched, so a record is never written without both halves.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the beacon log cannot be opened or written
    pub fn append(
        &self,
        dms: &DmsCoordinatePair,
        dd: DecimalDegreePair,
        fix_time: Option<NaiveTime>,
        sample: Result<TelemetrySample>,
    ) -> Result<AppendOutcome> {
        let sample = match sample {
            Ok(sample) => sample,
            Err(e) => {
                let reason = e.to_string();
                warn!("No beacon record written: {}", reason);
                if self.echo {
                    println!("{}", reason);
                }
                return Ok(AppendOutcome::Skipped { reason });
            }
        };

        let record = BeaconRecord::new(dms, dd, &sample, fix_time);
        self.write_record(&record)?;
        Ok(AppendOutcome::Written(record))
    }

    /// Append a prepared record, creating the log if needed
    pub fn write_record(&self, record: &BeaconRecord) -> Result<()> {
        let line = record.to_line(self.format)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        info!("Beacon record appended to {}", self.path.display());
        if self.echo {
            print!("{}", line);
        }
        Ok(())
    }
}
