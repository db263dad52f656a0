//! US AQI colour bands.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiBand {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
}

impl AqiBand {
    /// Step function on the breakpoints 50 / 100 / 150 (upper bounds inclusive).
    /// NaN has no band.
    pub fn from_value(aqi: f64) -> Option<Self> {
        if aqi.is_nan() {
            None
        } else if aqi <= 50.0 {
            Some(Self::Good)
        } else if aqi <= 100.0 {
            Some(Self::Moderate)
        } else if aqi <= 150.0 {
            Some(Self::UnhealthyForSensitiveGroups)
        } else {
            Some(Self::Unhealthy)
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Good => "#2ecc71",
            Self::Moderate => "#f1c40f",
            Self::UnhealthyForSensitiveGroups => "#e67e22",
            Self::Unhealthy => "#e74c3c",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
        }
    }
}
