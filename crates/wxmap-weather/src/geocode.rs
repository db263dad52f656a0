//! Reverse geocoding for the card's place label.
//! Uses Nominatim (OpenStreetMap); no API key required.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use wxmap_core::ApiConfig;

use crate::location::Coordinates;
use crate::types::WeatherError;

const USER_AGENT: &str = concat!("wxmap/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// "Newburyport, Massachusetts": most specific place plus state (or country).
    fn label(self) -> Option<String> {
        let region = self.state.clone().or_else(|| self.country.clone());
        let place = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.county)
            .or(self.state)
            .or(self.country)?;

        match region {
            Some(r) if !r.is_empty() && r != place => Some(format!("{}, {}", place, r)),
            _ => Some(place),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    url: String,
}

impl Geocoder {
    pub fn new(api: &ApiConfig) -> Result<Self, WeatherError> {
        Self::with_url(&api.geocode_url, Duration::from_secs(api.timeout_secs))
    }

    pub fn with_url(url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Place name for `coords`, or `None` on any failure.
    pub async fn reverse(&self, coords: Coordinates) -> Option<String> {
        let response = match self
            .client
            .get(&self.url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("format", "json".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let label = body.address?.label();
        if let Some(name) = &label {
            tracing::debug!("Reverse geocoded {} to {}", coords, name);
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(json: serde_json::Value) -> NominatimAddress {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_label_prefers_city_and_state() {
        let addr = address(serde_json::json!({
            "town": "Newburyport",
            "county": "Essex County",
            "state": "Massachusetts",
            "country": "United States"
        }));
        assert_eq!(addr.label().as_deref(), Some("Newburyport, Massachusetts"));
    }

    #[test]
    fn test_label_falls_back_to_country() {
        let addr = address(serde_json::json!({
            "village": "Hallstatt",
            "country": "Österreich"
        }));
        assert_eq!(addr.label().as_deref(), Some("Hallstatt, Österreich"));
    }

    #[test]
    fn test_label_without_duplicate_region() {
        let addr = address(serde_json::json!({ "state": "Tasmania" }));
        assert_eq!(addr.label().as_deref(), Some("Tasmania"));
    }

    #[test]
    fn test_empty_address_has_no_label() {
        let addr = address(serde_json::json!({}));
        assert_eq!(addr.label(), None);
    }
}
