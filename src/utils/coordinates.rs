use serde::{Deserialize, Deserializer};

use crate::error::{ProcessingError, Result};

/// Rough bounding box of the Indonesian archipelago
pub const INDONESIA_MIN_LAT: f64 = -11.5;
pub const INDONESIA_MAX_LAT: f64 = 6.5;
pub const INDONESIA_MIN_LON: f64 = 94.5;
pub const INDONESIA_MAX_LON: f64 = 141.5;

/// Parse a coordinate given as decimal degrees or `DD:MM:SS`.
///
/// Geocoder output stores coordinates as strings, so both forms show up in catalogs.
///
/// # Examples
/// ```
/// use irradiance_processor::utils::parse_coordinate;
///
/// assert!((parse_coordinate("-6.2088").unwrap() + 6.2088).abs() < 1e-9);
/// assert!((parse_coordinate("-6:12:31").unwrap() + 6.208611).abs() < 1e-6);
/// ```
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();

    let value = if trimmed.contains(':') {
        dms_to_decimal(trimmed)?
    } else {
        trimmed.parse::<f64>().map_err(|_| {
            ProcessingError::InvalidCoordinate(format!("Invalid coordinate value: '{}'", coord_str))
        })?
    };

    if !value.is_finite() {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Coordinate is not finite: '{}'",
            coord_str
        )));
    }

    Ok(value)
}

fn dms_to_decimal(dms: &str) -> Result<f64> {
    let parts: Vec<&str> = dms.split(':').collect();
    if parts.len() != 3 {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Invalid DMS format: '{}'. Expected format: 'DD:MM:SS'",
            dms
        )));
    }

    let field = |s: &str, what: &str| {
        s.parse::<f64>().map_err(|_| {
            ProcessingError::InvalidCoordinate(format!("Invalid {} value: '{}'", what, s))
        })
    };
    let degrees = field(parts[0], "degrees")?;
    let minutes = field(parts[1], "minutes")?;
    let seconds = field(parts[2], "seconds")?;

    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Minutes and seconds must be in [0, 60): '{}'",
            dms
        )));
    }

    let magnitude = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    Ok(if dms.starts_with('-') { -magnitude } else { magnitude })
}

/// Reject coordinates outside the valid latitude/longitude ranges
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Longitude {} is outside [-180, 180]",
            longitude
        )));
    }

    Ok(())
}

pub fn is_within_indonesia(latitude: f64, longitude: f64) -> bool {
    (INDONESIA_MIN_LAT..=INDONESIA_MAX_LAT).contains(&latitude)
        && (INDONESIA_MIN_LON..=INDONESIA_MAX_LON).contains(&longitude)
}

/// Geocoders hand back coordinates as strings; hand-edited files use numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    pub fn resolve(&self) -> Result<f64> {
        match self {
            CoordinateValue::Number(v) => Ok(*v),
            CoordinateValue::Text(s) => parse_coordinate(s),
        }
    }
}

/// `deserialize_with` helper for coordinate fields that may hold either form.
pub fn deserialize_coordinate<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    CoordinateValue::deserialize(deserializer)?
        .resolve()
        .map_err(serde::de::Error::custom)
}
