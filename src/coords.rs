use crate::error::AppError;
use crate::metadata::RawGeoCoordinate;

/// Converts degrees/minutes/seconds to signed decimal degrees.
///
/// South and West references flip the sign. The reference is matched by
/// membership, so values like `"S "` or `"West"` are accepted too.
pub fn decimal_degrees(coords: &RawGeoCoordinate) -> f64 {
    let dec = coords.degrees + coords.minutes / 60.0 + coords.seconds / 3600.0;
    if coords.reference.contains('S') || coords.reference.contains('W') {
        -dec
    } else {
        dec
    }
}

pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Arithmetic mean used to frame the map. Empty input has no center.
pub fn center(values: &[f64]) -> Result<f64, AppError> {
    if values.is_empty() {
        return Err(AppError::EmptyInput);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}
