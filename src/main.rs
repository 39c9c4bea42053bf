//! # Beacon Logger
//!
//! Logs one GPS fix together with the latest SDR power/SNR sample.
//!
//! Meant to be started by an external scheduler (cron, Task Scheduler):
//! each invocation reads a single fix and exits.
//!
//! # Control Flow
//!
//! 1. Load configuration (`beacon.toml` when present, defaults otherwise)
//! 2. Probe serial ports until the GPS receiver answers
//! 3. Read a GPGGA sentence and convert it to decimal degrees
//! 4. Read the last row of the telemetry CSV
//! 5. Append the combined record to the beacon log and echo it
//!
//! # Exit Status
//!
//! - `0` when a record was written, and when the telemetry CSV could not be
//!   read (nothing is written in that case)
//! - `1` for every other failure, including no receiver on any port

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use beacon_logger::app;
use beacon_logger::beacon::AppendOutcome;
use beacon_logger::config::Config;
use beacon_logger::logging;
use beacon_logger::serial::port_trait::TokioSerialOpener;

/// Configuration file read when `--config` is not given
const DEFAULT_CONFIG_PATH: &str = "beacon.toml";

#[derive(Parser, Debug)]
#[command(name = "beacon-logger", version, about = "Log a GPS fix with the latest SDR SNR sample")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// First serial port number to probe
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    start_port: Option<u16>,

    /// Telemetry CSV to correlate with
    #[arg(short, long, value_name = "CSV")]
    telemetry: Option<String>,

    /// Beacon log to append to
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Beacon log format
    #[arg(long, value_parser = ["csv", "jsonl"])]
    format: Option<String>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_PATH))?,
        None => Config::default(),
    };

    if let Some(csv_path) = &cli.telemetry {
        config.telemetry.csv_path = csv_path.clone();
    }
    if let Some(log_path) = &cli.output {
        config.beacon.log_path = log_path.clone();
    }
    if let Some(format) = &cli.format {
        config.beacon.format = format.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let _log_guard =
        logging::init(&config.logging).context("Failed to open diagnostics directory")?;

    info!("Beacon Logger v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = app::run(&config, &TokioSerialOpener, cli.start_port)
        .await
        .context("Beacon acquisition failed")?;

    match result.outcome {
        AppendOutcome::Written(_) => info!("Done ({})", result.port.name),
        AppendOutcome::Skipped { reason } => info!("Done without writing a record: {}", reason),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "beacon-logger",
            "--config",
            "/nonexistent/beacon.toml",
        ]);
        assert!(load_config(&cli).is_err());

        let cli = Cli::parse_from([
            "beacon-logger",
            "--start-port",
            "5",
            "--telemetry",
            "sdr.csv",
            "--output",
            "out.txt",
            "--format",
            "jsonl",
        ]);
        assert_eq!(cli.start_port, Some(5));

        let config = load_config(&cli).unwrap();
        assert_eq!(config.telemetry.csv_path, "sdr.csv");
        assert_eq!(config.beacon.log_path, "out.txt");
        assert_eq!(config.beacon.format, "jsonl");
    }

    #[test]
    fn test_start_port_must_be_positive() {
        assert!(Cli::try_parse_from(["beacon-logger", "--start-port", "0"]).is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["beacon-logger", "--format", "xml"]).is_err());
    }
}
