//! # Coordinate Conversion
//!
//! Converts NMEA degree/minute coordinates into signed decimal degrees.
//!
//! NMEA coordinates are fixed-width on the integer side: latitude has a
//! 2-digit degree prefix (`DDMM.MMMM`), longitude a 3-digit degree prefix
//! (`DDDMM.MMMM`). The two digits before the decimal point are whole
//! minutes and everything after it is the fractional minute, whatever its
//! precision.
//!
//! ```
//! use beacon_logger::nmea::coordinate::dms_to_dd;
//!
//! let dd = dms_to_dd("4744.00N,12219.73W")?;
//! assert_eq!(dd.to_string(), "47.7333,-122.3288");
//! # Ok::<(), beacon_logger::error::BeaconError>(())
//! ```

use std::fmt;

use super::gpgga::Hemisphere;
use crate::error::{BeaconError, Result};

/// Decimal places kept in converted coordinates
const DECIMAL_PLACES: i32 = 4;

/// Which axis a coordinate field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateKind {
    Latitude,
    Longitude,
}

impl CoordinateKind {
    /// Width of the degree prefix
    pub fn degree_digits(self) -> usize {
        match self {
            CoordinateKind::Latitude => 2,
            CoordinateKind::Longitude => 3,
        }
    }

    fn max_degrees(self) -> f64 {
        match self {
            CoordinateKind::Latitude => 90.0,
            CoordinateKind::Longitude => 180.0,
        }
    }

    /// Whether a hemisphere suffix makes this coordinate negative
    fn is_negative_suffix(self, suffix: char) -> bool {
        match self {
            CoordinateKind::Latitude => suffix.eq_ignore_ascii_case(&'s'),
            CoordinateKind::Longitude => suffix.eq_ignore_ascii_case(&'w'),
        }
    }
}

/// NMEA coordinate pair with hemisphere suffixes
///
/// Displays as `"{lat}{N|S},{lon}{E|W}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmsCoordinatePair {
    pub latitude: String,
    pub latitude_hemisphere: Hemisphere,
    pub longitude: String,
    pub longitude_hemisphere: Hemisphere,
}

impl DmsCoordinatePair {
    pub fn new(
        latitude: String,
        latitude_hemisphere: Hemisphere,
        longitude: String,
        longitude_hemisphere: Hemisphere,
    ) -> Self {
        Self {
            latitude,
            latitude_hemisphere,
            longitude,
            longitude_hemisphere,
        }
    }

    /// Convert both coordinates to signed decimal degrees
    ///
    /// # Errors
    ///
    /// Returns `MalformedCoordinate` if either field does not match the
    /// NMEA fixed-width layout.
    pub fn to_decimal(&self) -> Result<DecimalDegreePair> {
        let latitude = signed_degrees(
            &self.latitude,
            CoordinateKind::Latitude,
            self.latitude_hemisphere.is_negative(),
        )?;
        let longitude = signed_degrees(
            &self.longitude,
            CoordinateKind::Longitude,
            self.longitude_hemisphere.is_negative(),
        )?;

        Ok(DecimalDegreePair { latitude, longitude })
    }
}

impl fmt::Display for DmsCoordinatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{},{}{}",
            self.latitude,
            self.latitude_hemisphere.as_char(),
            self.longitude,
            self.longitude_hemisphere.as_char()
        )
    }
}

/// Signed decimal degrees, rounded to 4 decimal places
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimalDegreePair {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for DecimalDegreePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug keeps the shortest round-trip digits and always a fractional part
        write!(f, "{:?},{:?}", self.latitude, self.longitude)
    }
}

/// Convert a textual coordinate pair such as `4744.00N,12219.73W`
///
/// The last character of each half is the hemisphere suffix. A latitude
/// is negative for `S`, a longitude for `W` (either case); any other
/// suffix letter leaves the value positive.
///
/// # Errors
///
/// Returns `MalformedCoordinate` if the text is not two comma-separated
/// coordinates with alphabetic suffixes in the NMEA fixed-width layout.
pub fn dms_to_dd(dms: &str) -> Result<DecimalDegreePair> {
    let dms = dms.trim().trim_matches('\'');
    let (latitude, longitude) = dms.split_once(',').ok_or_else(|| {
        BeaconError::MalformedCoordinate(format!("expected 'lat,lon', got '{}'", dms))
    })?;

    Ok(DecimalDegreePair {
        latitude: convert_suffixed(latitude.trim(), CoordinateKind::Latitude)?,
        longitude: convert_suffixed(longitude.trim(), CoordinateKind::Longitude)?,
    })
}

fn convert_suffixed(field: &str, kind: CoordinateKind) -> Result<f64> {
    let suffix = field
        .chars()
        .last()
        .filter(char::is_ascii_alphabetic)
        .ok_or_else(|| {
            BeaconError::MalformedCoordinate(format!("'{}' has no hemisphere suffix", field))
        })?;

    let value = &field[..field.len() - suffix.len_utf8()];
    signed_degrees(value, kind, kind.is_negative_suffix(suffix))
}

fn signed_degrees(value: &str, kind: CoordinateKind, negative: bool) -> Result<f64> {
    let magnitude = round_to_places(parse_degrees(value, kind)?, DECIMAL_PLACES);
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parse an unsigned NMEA coordinate field into decimal degrees
///
/// # Errors
///
/// Returns `MalformedCoordinate` if the integer part is not exactly
/// degree digits plus two minute digits, the fraction is not numeric,
/// minutes reach 60, or degrees exceed the axis range.
pub fn parse_degrees(value: &str, kind: CoordinateKind) -> Result<f64> {
    let malformed = |reason: &str| {
        BeaconError::MalformedCoordinate(format!("{:?} '{}': {}", kind, value, reason))
    };

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));

    let degree_digits = kind.degree_digits();
    if whole.len() != degree_digits + 2 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(&format!(
            "expected {} integer digits",
            degree_digits + 2
        )));
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("fractional minutes must be digits"));
    }

    let degrees: f64 = whole[..degree_digits]
        .parse::<u16>()
        .map_err(|_| malformed("invalid degrees"))?
        .into();
    let minutes: f64 = format!("{}.{}", &whole[degree_digits..], fraction)
        .trim_end_matches('.')
        .parse()
        .map_err(|_| malformed("invalid minutes"))?;

    if minutes >= 60.0 {
        return Err(malformed("minutes must be below 60"));
    }

    let result = degrees + minutes / 60.0;
    if result > kind.max_degrees() {
        return Err(malformed("out of range"));
    }

    Ok(result)
}

fn round_to_places(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_fix() {
        let dd = dms_to_dd("4744.00N,12219.73W").unwrap();
        assert_eq!(dd.latitude, 47.7333);
        assert_eq!(dd.longitude, -122.3288);
        assert_eq!(dd.to_string(), "47.7333,-122.3288");
    }

    #[test]
    fn test_sign_follows_hemisphere() {
        let cases = [
            ("4744.00N,12219.73E", false, false),
            ("4744.00n,12219.73e", false, false),
            ("4744.00S,12219.73E", true, false),
            ("4744.00s,12219.73W", true, true),
            ("4744.00N,12219.73w", false, true),
        ];

        for (input, lat_negative, lon_negative) in cases {
            let dd = dms_to_dd(input).unwrap();
            assert_eq!(dd.latitude < 0.0, lat_negative, "latitude sign for {}", input);
            assert_eq!(dd.longitude < 0.0, lon_negative, "longitude sign for {}", input);
            assert_eq!(dd.latitude.abs(), 47.7333);
            assert_eq!(dd.longitude.abs(), 122.3288);
        }
    }

    #[test]
    fn test_variable_precision_fraction() {
        // 07.038 minutes and 07.0380000 minutes are the same position
        let short = parse_degrees("4807.038", CoordinateKind::Latitude).unwrap();
        let long = parse_degrees("4807.0380000", CoordinateKind::Latitude).unwrap();
        assert!((short - long).abs() < 1e-12);
        assert!((short - 48.1173).abs() < 1e-4);
    }

    #[test]
    fn test_without_fraction() {
        let value = parse_degrees("01131", CoordinateKind::Longitude).unwrap();
        assert!((value - (11.0 + 31.0 / 60.0)).abs() < 1e-12);
        assert_eq!(
            parse_degrees("01131.", CoordinateKind::Longitude).unwrap(),
            value
        );
    }

    #[test]
    fn test_rounding_to_four_places() {
        let dd = dms_to_dd("0000.01N,00000.01E").unwrap();
        // 0.01 minutes = 0.000166.. degrees
        assert_eq!(dd.latitude, 0.0002);
        assert_eq!(dd.to_string(), "0.0002,0.0002");
    }

    #[test]
    fn test_whole_degrees_keep_fraction_digit() {
        let dd = dms_to_dd("4700.00N,12200.00W").unwrap();
        assert_eq!(dd.to_string(), "47.0,-122.0");
    }

    #[test]
    fn test_typed_pair_matches_text() {
        let pair = DmsCoordinatePair::new(
            "4744.00".to_string(),
            Hemisphere::North,
            "12219.73".to_string(),
            Hemisphere::West,
        );
        assert_eq!(pair.to_string(), "4744.00N,12219.73W");
        assert_eq!(pair.to_decimal().unwrap(), dms_to_dd(&pair.to_string()).unwrap());
    }

    #[test]
    fn test_wrong_degree_width() {
        // Latitude written with a 3-digit degree prefix
        assert!(matches!(
            dms_to_dd("04744.00N,12219.73W"),
            Err(BeaconError::MalformedCoordinate(_))
        ));
        // Longitude missing its leading zero
        assert!(matches!(
            dms_to_dd("4807.038N,1131.000E"),
            Err(BeaconError::MalformedCoordinate(_))
        ));
    }

    #[test]
    fn test_minutes_out_of_range() {
        assert!(parse_degrees("4760.00", CoordinateKind::Latitude).is_err());
    }

    #[test]
    fn test_degrees_out_of_range() {
        assert!(parse_degrees("9100.00", CoordinateKind::Latitude).is_err());
        assert!(parse_degrees("18100.00", CoordinateKind::Longitude).is_err());
        assert!(parse_degrees("18000.00", CoordinateKind::Longitude).is_ok());
    }

    #[test]
    fn test_non_numeric_fields() {
        assert!(parse_degrees("47x4.00", CoordinateKind::Latitude).is_err());
        assert!(parse_degrees("4744.0a", CoordinateKind::Latitude).is_err());
        assert!(parse_degrees("", CoordinateKind::Latitude).is_err());
    }

    #[test]
    fn test_missing_suffix_or_separator() {
        assert!(dms_to_dd("4744.00,12219.73W").is_err());
        assert!(dms_to_dd("4744.00N12219.73W").is_err());
    }

    #[test]
    fn test_quoted_input_accepted() {
        let dd = dms_to_dd("'4744.00N,12219.73W'").unwrap();
        assert_eq!(dd.to_string(), "47.7333,-122.3288");
    }
}
