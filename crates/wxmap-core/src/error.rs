//! Error hierarchy shared by the weather client, the HTTP API and the CLI.
//!
//! Caller mistakes (bad coordinates, unknown metrics) are kept apart from
//! upstream failures so the API can pick between 400 and 502, while the card
//! shows one short message whatever went wrong upstream.

use thiserror::Error;

/// Card text for a field whose fetch failed
pub const UNAVAILABLE: &str = "Unable to load data.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Upstream request failed: {0}")]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl AppError {
    /// Short text for the card or a CLI error line.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(_) => UNAVAILABLE,
            AppError::Weather(e) => e.user_message(),
        }
    }

    /// True when the request itself was wrong, as opposed to an upstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Weather(e) if e.is_client_error())
    }
}

/// Transport-level failures talking to Open-Meteo or Nominatim.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("timed out")]
    Timeout,

    #[error("could not connect: {0}")]
    Connect(String),

    #[error("status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("{endpoint} fetch failed ({status})")]
    Upstream { endpoint: &'static str, status: u16 },
}

impl WeatherError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            WeatherError::InvalidCoordinate(_) | WeatherError::UnknownMetric(_)
        )
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::InvalidCoordinate(_) => "Invalid coordinate.",
            WeatherError::UnknownMetric(_) => "Unknown chart metric.",
            WeatherError::Upstream { .. } => UNAVAILABLE,
        }
    }
}

/// Classify a reqwest failure.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::Malformed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::Status {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::Connect(self.to_string())
        }
    }
}
