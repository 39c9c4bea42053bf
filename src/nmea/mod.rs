//! # NMEA Module
//!
//! Parsing of NMEA 0183 sentences emitted by serial GPS receivers.
//!
//! This module handles:
//! - GPGGA fix sentence parsing
//! - `*hh` checksum verification
//! - Conversion of NMEA degree/minute coordinates to decimal degrees

pub mod checksum;
pub mod coordinate;
pub mod gpgga;

/// Sentence identifier of the GPS fix sentence
pub const GPGGA_MARKER: &str = "GPGGA";

/// An unparsed line read from the serial stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSentence(String);

impl RawSentence {
    /// Wrap a line, stripping any trailing `\r` / `\n`
    pub fn new(line: impl Into<String>) -> Self {
        let mut line = line.into();
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Self(line)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the line carries the GPGGA sentence identifier
    pub fn is_gpgga(&self) -> bool {
        self.0.contains(GPGGA_MARKER)
    }
}

impl std::fmt::Display for RawSentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
