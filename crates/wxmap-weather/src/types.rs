use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert a WMO weather code to a condition.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            1 | 2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            // freezing drizzle and freezing rain
            56 | 57 | 66 | 67 => Self::Sleet,
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Icon class for the card
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "pi-sun",
            Self::PartlyCloudy | Self::Cloudy | Self::Fog => "pi-cloud",
            Self::Drizzle | Self::Rain | Self::HeavyRain => "pi-cloud-rain",
            Self::Snow | Self::Sleet => "pi-cloud-snow",
            Self::Thunderstorm => "pi-bolt",
        }
    }
}

/// Latest temperature/wind snapshot for a coordinate.
///
/// `time` is local to the coordinate; `utc_offset_seconds` gives the offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: NaiveDateTime,
    pub utc_offset_seconds: i32,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub weather_code: i32,
}

impl CurrentConditions {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }
}

/// Daily precipitation over the trailing window, in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainHistory {
    pub daily: Vec<Option<f64>>,
    pub total: f64,
}

impl RainHistory {
    /// Missing days count as zero in the total.
    pub fn from_daily(daily: Vec<Option<f64>>) -> Self {
        let total = daily.iter().flatten().sum();
        Self { daily, total }
    }
}

/// One value per day, aligned with `dates`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

/// Weather client errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{endpoint} fetch failed ({status})")]
    Api { endpoint: &'static str, status: u16 },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("Unknown metric '{0}'")]
    UnknownMetric(String),
}

impl From<WeatherError> for wxmap_core::AppError {
    fn from(err: WeatherError) -> Self {
        use wxmap_core::{NetworkError, ReqwestErrorExt};

        match err {
            WeatherError::Network(e) => Self::Network(e.into_network_error()),
            WeatherError::Parse(msg) => Self::Network(NetworkError::Malformed(msg)),
            WeatherError::Api { endpoint, status } => {
                Self::Weather(wxmap_core::WeatherError::Upstream { endpoint, status })
            }
            WeatherError::InvalidCoordinate(msg) => {
                Self::Weather(wxmap_core::WeatherError::InvalidCoordinate(msg))
            }
            WeatherError::UnknownMetric(id) => {
                Self::Weather(wxmap_core::WeatherError::UnknownMetric(id))
            }
        }
    }
}
