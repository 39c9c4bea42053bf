//! # NMEA Checksum
//!
//! XOR checksum over the characters between `$` and `*`.

/// Compute the NMEA checksum of a sentence body (without `$` and `*hh`)
///
/// # Examples
///
/// ```
/// use beacon_logger::nmea::checksum::nmea_checksum;
///
/// assert_eq!(nmea_checksum("GPGGA,,,,,,0,,,,,,,,"), 0x66);
/// ```
pub fn nmea_checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Verify the `*hh` checksum of a sentence
///
/// Returns `None` when the line carries no checksum (or no `$` start
/// delimiter), otherwise whether the transmitted value matches.
pub fn verify_checksum(line: &str) -> Option<bool> {
    let line = line.trim_end();
    let start = line.rfind('$')?;
    let star = line[start..].find('*')? + start;

    let transmitted = line.get(star + 1..star + 3)?;
    let expected = u8::from_str_radix(transmitted, 16).ok()?;

    Some(nmea_checksum(&line[start + 1..star]) == expected)
}
