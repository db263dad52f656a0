//! Current-conditions card. Every field starts as a placeholder and is filled
//! in as each fetch settles; a failed fetch leaves its placeholder.

use serde::Serialize;

use crate::aqi::AqiBand;
use crate::location::Coordinates;
use crate::types::{CurrentConditions, RainHistory};
use crate::units::format_dual_temperature;

pub const NO_VALUE: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub coordinates: String,
    pub place: Option<String>,
    pub temperature: String,
    pub wind: String,
    pub timestamp: String,
    pub condition: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub elevation: String,
    pub aqi: String,
    pub aqi_color: Option<&'static str>,
    pub rain: String,
}

impl Card {
    pub fn placeholder(coords: Coordinates) -> Self {
        Self {
            coordinates: format!(
                "Longitude: {:.5}, Latitude: {:.5}",
                coords.longitude, coords.latitude
            ),
            place: None,
            temperature: NO_VALUE.to_string(),
            wind: format!("Wind {} km/h", NO_VALUE),
            timestamp: NO_VALUE.to_string(),
            condition: None,
            icon: None,
            elevation: format!("Elevation {} m", NO_VALUE),
            aqi: format!("U.S. AQI {}", NO_VALUE),
            aqi_color: None,
            rain: format!("Rain 30 d {} mm", NO_VALUE),
        }
    }

    pub fn set_current(&mut self, current: &CurrentConditions) {
        let condition = current.condition();
        self.temperature = format_dual_temperature(current.temperature_c);
        self.wind = format!("Wind {:.1} km/h", current.wind_speed_kmh);
        self.timestamp = current.time.format("%a %H:%M").to_string();
        self.condition = Some(condition.description());
        self.icon = Some(condition.icon());
    }

    /// `message` replaces the wind line.
    pub fn set_current_unavailable(&mut self, message: &str) {
        self.temperature = NO_VALUE.to_string();
        self.wind = message.to_string();
    }

    pub fn set_elevation(&mut self, metres: f64) {
        if metres.is_finite() {
            self.elevation = format!("Elevation {:.0} m", metres);
        }
    }

    pub fn set_air_quality(&mut self, aqi: f64) {
        if let Some(band) = AqiBand::from_value(aqi) {
            self.aqi = format!("U.S. AQI {}", aqi);
            self.aqi_color = Some(band.color());
        }
    }

    pub fn set_rain(&mut self, rain: &RainHistory) {
        self.rain = format!("Rain 30 d {:.0} mm", rain.total);
    }
}
