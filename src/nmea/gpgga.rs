//! # GPGGA Sentence Parser
//!
//! Extracts the position fix from a GPGGA sentence.
//!
//! ## Field Layout
//!
//! ```text
//! $GPGGA,hhmmss.ss,DDMM.MMMM,N,DDDMM.MMMM,W,q,ss,hdop,alt,M,geoid,M,age,ref*hh
//!   0        1         2     3      4     5 6  7   8   9
//! ```
//!
//! Coordinates are kept as the receiver's text; conversion happens in
//! [`crate::nmea::coordinate`].

use chrono::NaiveTime;

use super::coordinate::DmsCoordinatePair;
use super::{RawSentence, GPGGA_MARKER};
use crate::error::{BeaconError, Result};

const FIELD_TIME: usize = 1;
const FIELD_LATITUDE: usize = 2;
const FIELD_LATITUDE_HEMISPHERE: usize = 3;
const FIELD_LONGITUDE: usize = 4;
const FIELD_LONGITUDE_HEMISPHERE: usize = 5;
const FIELD_FIX_QUALITY: usize = 6;
const FIELD_SATELLITES: usize = 7;
const FIELD_ALTITUDE: usize = 9;

/// Minimum number of comma-separated fields up to and including altitude
const MIN_FIELDS: usize = FIELD_ALTITUDE + 1;

/// Compass hemisphere of a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Upper-case NMEA letter for this hemisphere
    pub fn as_char(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }

    /// South and West carry a negative sign in decimal degrees
    pub fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }

    fn parse_latitude(field: &str) -> Option<Self> {
        match field.to_ascii_uppercase().as_str() {
            "N" => Some(Hemisphere::North),
            "S" => Some(Hemisphere::South),
            _ => None,
        }
    }

    fn parse_longitude(field: &str) -> Option<Self> {
        match field.to_ascii_uppercase().as_str() {
            "E" => Some(Hemisphere::East),
            "W" => Some(Hemisphere::West),
            _ => None,
        }
    }
}

/// Position fix carried by a GPGGA sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpggaFix {
    /// UTC time of the fix, "HHMMSS.ss"
    pub time_stamp: String,
    /// Latitude as "DDMM.MMMM"
    pub latitude: String,
    pub latitude_hemisphere: Hemisphere,
    /// Longitude as "DDDMM.MMMM"
    pub longitude: String,
    pub longitude_hemisphere: Hemisphere,
    /// GPS quality indicator (0 = invalid, 1 = GPS, 2 = DGPS, ...)
    pub fix_quality: String,
    pub satellites: String,
    /// Antenna altitude above mean sea level, metres
    pub altitude: String,
}

impl GpggaFix {
    /// Coordinate pair with hemisphere suffixes, e.g. `4744.00N,12219.73W`
    pub fn dms_pair(&self) -> DmsCoordinatePair {
        DmsCoordinatePair::new(
            self.latitude.clone(),
            self.latitude_hemisphere,
            self.longitude.clone(),
            self.longitude_hemisphere,
        )
    }

    /// Fix time parsed as a UTC time of day, if the receiver sent one
    pub fn utc_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.time_stamp, "%H%M%S%.f").ok()
    }
}

/// Parse a GPGGA sentence
///
/// # Arguments
///
/// * `sentence` - Line containing a GPGGA sentence; any noise before the
///   `$GPGGA` start and a trailing `*hh` checksum are ignored
///
/// # Errors
///
/// Returns `MalformedSentence` if:
/// - The line does not contain `GPGGA`
/// - Fewer than 10 fields are present
/// - A coordinate field is empty (receiver has no fix)
/// - A hemisphere is not N/S (latitude) or E/W (longitude)
///
/// # Examples
///
/// ```
/// use beacon_logger::nmea::RawSentence;
/// use beacon_logger::nmea::gpgga::parse_gpgga;
///
/// let raw =
///     RawSentence::new("$GPGGA,155613.00,4744.00,N,12219.73,W,1,08,1.0,45.2,M,-17.0,M,,*64");
/// let fix = parse_gpgga(&raw)?;
/// assert_eq!(fix.dms_pair().to_string(), "4744.00N,12219.73W");
/// # Ok::<(), beacon_logger::error::BeaconError>(())
/// ```
pub fn parse_gpgga(sentence: &RawSentence) -> Result<GpggaFix> {
    let line = sentence.as_str();

    let marker = line.find(GPGGA_MARKER).ok_or_else(|| {
        BeaconError::MalformedSentence(format!("no {} identifier in '{}'", GPGGA_MARKER, line))
    })?;

    let body = &line[marker..];
    let body = match body.rfind('*') {
        Some(star) => &body[..star],
        None => body,
    };

    let fields: Vec<&str> = body.split(',').map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return Err(BeaconError::MalformedSentence(format!(
            "expected at least {} fields, got {}",
            MIN_FIELDS,
            fields.len()
        )));
    }

    let latitude = fields[FIELD_LATITUDE];
    let longitude = fields[FIELD_LONGITUDE];
    if latitude.is_empty() || longitude.is_empty() {
        return Err(BeaconError::MalformedSentence(
            "sentence carries no position (receiver has no fix)".to_string(),
        ));
    }

    let latitude_hemisphere = Hemisphere::parse_latitude(fields[FIELD_LATITUDE_HEMISPHERE])
        .ok_or_else(|| {
            BeaconError::MalformedSentence(format!(
                "invalid latitude hemisphere '{}'",
                fields[FIELD_LATITUDE_HEMISPHERE]
            ))
        })?;

    let longitude_hemisphere = Hemisphere::parse_longitude(fields[FIELD_LONGITUDE_HEMISPHERE])
        .ok_or_else(|| {
            BeaconError::MalformedSentence(format!(
                "invalid longitude hemisphere '{}'",
                fields[FIELD_LONGITUDE_HEMISPHERE]
            ))
        })?;

    Ok(GpggaFix {
        time_stamp: fields[FIELD_TIME].to_string(),
        latitude: latitude.to_string(),
        latitude_hemisphere,
        longitude: longitude.to_string(),
        longitude_hemisphere,
        fix_quality: fields[FIELD_FIX_QUALITY].to_string(),
        satellites: fields[FIELD_SATELLITES].to_string(),
        altitude: fields[FIELD_ALTITUDE].to_string(),
    })
}
