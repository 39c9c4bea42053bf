//! # Serial Communication Module
//!
//! Locates the GPS receiver and reads one GPGGA sentence from it.
//!
//! This module handles:
//! - Enumerating candidate serial ports (`COM1`..`COM10` by default)
//! - Probing each candidate at 4800 baud 8N1 with a 1 second read timeout
//! - Reading lines from the accepted port until a GPGGA sentence arrives
//! - Releasing the port before returning
//!
//! USB serial adapters enumerate differently on every machine and the
//! receiver offers no identification handshake, so the first port that
//! opens and yields data is taken to be the receiver.

pub mod line_reader;
pub mod port_trait;

use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::config::SerialConfig;
use crate::error::{BeaconError, Result};
use crate::nmea::checksum::verify_checksum;
use crate::nmea::RawSentence;
use line_reader::{LineReader, READ_CHUNK_SIZE};
use port_trait::{PortOpener, SerialSettings};

/// A numbered serial port and its platform device name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCandidate {
    pub number: u16,
    pub name: String,
}

/// Bounded, ordered list of ports to probe
///
/// # Examples
///
/// ```
/// use beacon_logger::serial::PortCandidates;
///
/// let names: Vec<String> = PortCandidates::new("COM{n}", 1, 3).map(|c| c.name).collect();
/// assert_eq!(names, ["COM1", "COM2", "COM3"]);
/// ```
#[derive(Debug, Clone)]
pub struct PortCandidates {
    template: String,
    next: u32,
    last: u32,
}

impl PortCandidates {
    /// Candidates `first..=last`; `{n}` in `template` becomes the port
    /// number and `{i}` the zero-based index (`number - 1`)
    pub fn new(template: impl Into<String>, first: u16, last: u16) -> Self {
        Self {
            template: template.into(),
            next: first.into(),
            last: last.into(),
        }
    }

    fn name_for(&self, number: u16) -> String {
        self.template
            .replace("{n}", &number.to_string())
            .replace("{i}", &number.saturating_sub(1).to_string())
    }
}

impl Iterator for PortCandidates {
    type Item = PortCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.last {
            return None;
        }
        let number = u16::try_from(self.next).ok()?;
        self.next += 1;
        Some(PortCandidate {
            number,
            name: self.name_for(number),
        })
    }
}

/// The GPGGA sentence and the port it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSentence {
    pub sentence: RawSentence,
    pub port: PortCandidate,
}

/// GPS receiver discovery over numbered serial ports
pub struct PortLocator<'a> {
    opener: &'a dyn PortOpener,
    config: SerialConfig,
    settings: SerialSettings,
}

impl std::fmt::Debug for PortLocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortLocator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> PortLocator<'a> {
    pub fn new(opener: &'a dyn PortOpener, config: &SerialConfig) -> Self {
        Self {
            opener,
            settings: SerialSettings::from(config),
            config: config.clone(),
        }
    }

    /// Candidate ports from `first` to the configured last port
    pub fn candidates(&self, first: u16) -> PortCandidates {
        PortCandidates::new(self.config.port_template.as_str(), first, self.config.last_port)
    }

    /// Find the receiver and read one GPGGA sentence from it
    ///
    /// # Arguments
    ///
    /// * `start_port` - First port number to probe (defaults to the
    ///   configured `first_port`)
    ///
    /// # Errors
    ///
    /// - `PortExhaustion`: no port up to `last_port` opened and returned data
    /// - `NoFixSentence`: the accepted port closed, or `max_lines` lines
    ///   passed without a GPGGA sentence
    /// - `Serial`: reading from the accepted port failed
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use beacon_logger::config::SerialConfig;
    /// use beacon_logger::serial::PortLocator;
    /// use beacon_logger::serial::port_trait::TokioSerialOpener;
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() -> anyhow::Result<()> {
    ///     let locator = PortLocator::new(&TokioSerialOpener, &SerialConfig::default());
    ///     let located = locator.locate_and_read(None).await?;
    ///     println!("{} from {}", located.sentence, located.port.name);
    ///     Ok(())
    /// }
    /// ```
    pub async fn locate_and_read(&self, start_port: Option<u16>) -> Result<LocatedSentence> {
        let (mut reader, port) = self.probe(start_port).await?;
        let sentence = self.read_gpgga(&mut reader, &port).await;

        // Release the device before handing back the sentence
        drop(reader);
        debug!("Closed serial port {}", port.name);

        let sentence = sentence?;
        info!("Received GPGGA sentence from {}", port.name);
        Ok(LocatedSentence { sentence, port })
    }

    /// Open candidates in order until one yields data on its first read
    async fn probe(&self, start_port: Option<u16>) -> Result<(LineReader, PortCandidate)> {
        let first = start_port.unwrap_or(self.config.first_port);

        for candidate in self.candidates(first) {
            debug!("Trying serial port {}", candidate.name);

            let mut port = match self.opener.open(&candidate.name, &self.settings) {
                Ok(port) => port,
                Err(e) => {
                    debug!("Skipping {}: {}", candidate.name, e);
                    continue;
                }
            };

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let first_read = timeout(self.settings.timeout, port.read(&mut chunk)).await;
            match first_read {
                Ok(Ok(n)) if n > 0 => {
                    info!("GPS receiver found on {}", candidate.name);
                    return Ok((LineReader::new(port, &chunk[..n]), candidate));
                }
                Ok(Ok(_)) => debug!("No data from {}", candidate.name),
                Ok(Err(e)) => warn!("Failed to read from {}: {}", candidate.name, e),
                Err(_) => debug!(
                    "Read from {} timed out after {:?}",
                    candidate.name, self.settings.timeout
                ),
            }
        }

        Err(BeaconError::PortExhaustion {
            first,
            last: self.config.last_port,
        })
    }

    /// Read lines until one carries a GPGGA sentence
    async fn read_gpgga(
        &self,
        reader: &mut LineReader,
        port: &PortCandidate,
    ) -> Result<RawSentence> {
        for _ in 0..self.config.max_lines {
            let Some(line) = reader.next_line(self.settings.timeout).await? else {
                trace!("Read from {} timed out", port.name);
                continue;
            };

            let sentence = RawSentence::new(line);
            if !sentence.is_gpgga() {
                trace!("Ignoring sentence: {}", sentence);
                continue;
            }

            if self.config.verify_checksum && verify_checksum(sentence.as_str()) == Some(false) {
                warn!("Discarding GPGGA sentence with bad checksum: {}", sentence);
                continue;
            }

            return Ok(sentence);
        }

        Err(BeaconError::NoFixSentence(format!(
            "{} lines read from {} without a GPGGA sentence",
            self.config.max_lines, port.name
        )))
    }
}
