//! Azimuth origin convention.

/// Rotate an engine azimuth (south origin) to north origin.
///
/// The wrap is applied once: inputs in `[0, 360)` land in `[0, 360)`.
pub fn rotate_azimuth(raw_deg: f64) -> f64 {
    let az = raw_deg + 180.0;
    if az >= 360.0 { az - 360.0 } else { az }
}
