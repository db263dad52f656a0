//! Coordinates, request parsing, and the rounded keys used to bucket nearby queries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::WeatherError;

pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);

/// Digits kept by the series cache key (~1 km grid)
pub const SERIES_KEY_DIGITS: usize = 2;
/// Digits kept by the elevation cache key
pub const ELEVATION_KEY_DIGITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        check_range(latitude, LAT_RANGE)?;
        check_range(longitude, LON_RANGE)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse optional query values, falling back to `default` for absent or empty ones.
    pub fn from_query(
        lat: Option<&str>,
        lon: Option<&str>,
        default: Coordinates,
    ) -> Result<Self, WeatherError> {
        let latitude = match lat.filter(|s| !s.is_empty()) {
            Some(v) => parse_coord(Some(v), LAT_RANGE.0, LAT_RANGE.1)?,
            None => default.latitude,
        };
        let longitude = match lon.filter(|s| !s.is_empty()) {
            Some(v) => parse_coord(Some(v), LON_RANGE.0, LON_RANGE.1)?,
            None => default.longitude,
        };
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

fn check_range(value: f64, (min, max): (f64, f64)) -> Result<(), WeatherError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(WeatherError::InvalidCoordinate("out of range".to_string()))
    }
}

/// Parse one coordinate component and check it against `[min, max]`.
pub fn parse_coord(value: Option<&str>, min: f64, max: f64) -> Result<f64, WeatherError> {
    let raw = value.ok_or_else(|| WeatherError::InvalidCoordinate("missing".to_string()))?;
    let coord: f64 = raw
        .trim()
        .parse()
        .map_err(|_| WeatherError::InvalidCoordinate("not a number".to_string()))?;
    check_range(coord, (min, max))?;
    Ok(coord)
}

/// Coordinates formatted to a fixed number of decimals, e.g. `"42.68,-70.90"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LocationKey(String);

impl LocationKey {
    pub fn rounded(coords: Coordinates) -> Self {
        Self::with_precision(coords, SERIES_KEY_DIGITS)
    }

    pub fn with_precision(coords: Coordinates, digits: usize) -> Self {
        Self(format!(
            "{:.*},{:.*}",
            digits, coords.latitude, digits, coords.longitude
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
