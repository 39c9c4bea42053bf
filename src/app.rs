//! # Beacon Run
//!
//! One invocation: locate the receiver, read a fix, correlate it with the
//! latest telemetry sample and append the beacon record.

use std::path::PathBuf;
use tracing::{debug, info};

use crate::beacon::{AppendOutcome, BeaconLogger};
use crate::config::Config;
use crate::error::Result;
use crate::nmea::gpgga::parse_gpgga;
use crate::serial::port_trait::PortOpener;
use crate::serial::{PortCandidate, PortLocator};
use crate::telemetry::TelemetryCorrelator;

/// What a completed run did
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Port the GPS receiver was found on
    pub port: PortCandidate,
    pub outcome: AppendOutcome,
}

/// Run one beacon acquisition
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `opener` - Serial port opener (`TokioSerialOpener` for real hardware)
/// * `start_port` - Overrides `serial.first_port` when set
///
/// # Errors
///
/// Fails when no receiver is found, no GPGGA sentence arrives, the sentence
/// or its coordinates are malformed, or the beacon log cannot be written.
/// Telemetry problems are not errors: they yield `AppendOutcome::Skipped`.
///
/// # Examples
///
/// ```no_run
/// use beacon_logger::app::run;
/// use beacon_logger::config::Config;
/// use beacon_logger::serial::port_trait::TokioSerialOpener;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let outcome = run(&Config::default(), &TokioSerialOpener, None).await?;
///     println!("receiver on {}", outcome.port.name);
///     Ok(())
/// }
/// ```
pub async fn run(
    config: &Config,
    opener: &dyn PortOpener,
    start_port: Option<u16>,
) -> Result<RunOutcome> {
    let located = PortLocator::new(opener, &config.serial)
        .locate_and_read(start_port)
        .await?;

    let fix = parse_gpgga(&located.sentence)?;
    let dms = fix.dms_pair();
    let dd = dms.to_decimal()?;
    debug!("Fix {} -> {} (altitude {} m)", dms, dd, fix.altitude);

    let csv_path = PathBuf::from(&config.telemetry.csv_path);
    let sample = TelemetryCorrelator::from(&config.telemetry).read_latest_sample(&csv_path);

    let logger = BeaconLogger::from_config(&config.beacon)?;
    let outcome = logger.append(&dms, dd, fix.utc_time(), sample)?;

    if outcome.is_written() {
        info!("Logged fix from {} to {}", located.port.name, logger.path().display());
    }

    Ok(RunOutcome {
        port: located.port,
        outcome,
    })
}
