//! Open-Meteo client: current conditions, forecast windows, archive years,
//! elevation, air quality and rainfall.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;
use wxmap_core::{ApiConfig, RetrySettings};

use crate::location::Coordinates;
use crate::metrics::{ChartMetric, SeriesResponse};
use crate::retry::{with_retry, RetryConfig};
use crate::types::{CurrentConditions, DailySeries, RainHistory, WeatherError};
use crate::window::DateWindow;

const CURRENT_VARS: &str = "temperature_2m,wind_speed_10m,weather_code";
const AQI_VAR: &str = "us_aqi";
const RAIN_VAR: &str = "precipitation_sum";
const RAIN_PAST_DAYS: u32 = 30;

/// Base URLs of the upstream APIs
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub forecast: String,
    pub archive: String,
    pub elevation: String,
    pub air_quality: String,
}

impl From<&ApiConfig> for Endpoints {
    fn from(api: &ApiConfig) -> Self {
        Self {
            forecast: api.forecast_url.clone(),
            archive: api.archive_url.clone(),
            elevation: api.elevation_url.clone(),
            air_quality: api.air_quality_url.clone(),
        }
    }
}

impl Endpoints {
    /// Every endpoint under one base URL, at the paths Open-Meteo uses.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            forecast: format!("{}/v1/forecast", base),
            archive: format!("{}/v1/archive", base),
            elevation: format!("{}/v1/elevation", base),
            air_quality: format!("{}/v1/air-quality", base),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    endpoints: Arc<Endpoints>,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    wind_speed_10m: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    #[serde(default)]
    elevation: Vec<f64>,
}

impl WeatherProvider {
    pub fn new(api: &ApiConfig, retry: &RetrySettings) -> Result<Self, WeatherError> {
        Self::with_endpoints(
            Endpoints::from(api),
            Duration::from_secs(api.timeout_secs),
            RetryConfig::from(retry),
        )
    }

    pub fn with_endpoints(
        endpoints: Endpoints,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            endpoints: Arc::new(endpoints),
            retry,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let response = with_retry(&self.retry, || self.client.get(url).query(query).send()).await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned status {}", endpoint, status);
            return Err(WeatherError::Api {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("{} response: {}", endpoint, e)))
    }

    /// Latest temperature, wind and weather code.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_current(&self, coords: Coordinates) -> Result<CurrentConditions, WeatherError> {
        let mut query = coord_query(coords);
        query.push(("current", CURRENT_VARS.to_string()));
        query.push(("timezone", "auto".to_string()));
        query.push(("forecast_days", "1".to_string()));

        let resp: CurrentResponse = self
            .get_json("current weather", &self.endpoints.forecast, &query)
            .await?;

        Ok(CurrentConditions {
            time: parse_local_time(&resp.current.time)?,
            utc_offset_seconds: resp.utc_offset_seconds,
            temperature_c: resp.current.temperature_2m,
            wind_speed_kmh: resp.current.wind_speed_10m,
            weather_code: resp.current.weather_code,
        })
    }

    /// The recent-past plus forecast window for `metric`, with its date axis.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_window(
        &self,
        metric: ChartMetric,
        coords: Coordinates,
        window: &DateWindow,
    ) -> Result<DailySeries, WeatherError> {
        let mut query = coord_query(coords);
        query.push(("timezone", "auto".to_string()));
        query.push(("past_days", window.past_days.to_string()));
        query.push(("forecast_days", window.forecast_days.to_string()));
        let (kind, vars) = metric.query_param();
        query.push((kind, vars));

        let resp: SeriesResponse = self
            .get_json("forecast window", &self.endpoints.forecast, &query)
            .await?;
        metric.extract(&resp)
    }

    /// The same window shifted into `year`, from the archive.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_archive(
        &self,
        metric: ChartMetric,
        coords: Coordinates,
        window: &DateWindow,
        year: i32,
    ) -> Result<Vec<Option<f64>>, WeatherError> {
        let (start, end) = window.archive_range(year);
        let mut query = coord_query(coords);
        query.push(("start_date", start.format("%Y-%m-%d").to_string()));
        query.push(("end_date", end.format("%Y-%m-%d").to_string()));
        query.push(("timezone", "auto".to_string()));
        let (kind, vars) = metric.query_param();
        query.push((kind, vars));

        let resp: SeriesResponse = self
            .get_json("archive", &self.endpoints.archive, &query)
            .await?;
        Ok(metric.extract(&resp)?.values)
    }

    /// Terrain elevation in metres; NaN when the response carries none.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_elevation(&self, coords: Coordinates) -> Result<f64, WeatherError> {
        let resp: ElevationResponse = self
            .get_json("elevation", &self.endpoints.elevation, &coord_query(coords))
            .await?;
        Ok(resp.elevation.first().copied().unwrap_or(f64::NAN))
    }

    /// US AQI for the current hour; NaN when unavailable.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_air_quality(&self, coords: Coordinates) -> Result<f64, WeatherError> {
        let mut query = coord_query(coords);
        query.push(("hourly", AQI_VAR.to_string()));
        query.push(("timezone", "UTC".to_string()));
        query.push(("forecast_hours", "1".to_string()));
        query.push(("past_hours", "1".to_string()));

        let resp: SeriesResponse = self
            .get_json("air quality", &self.endpoints.air_quality, &query)
            .await?;

        let latest = resp
            .hourly
            .as_ref()
            .and_then(|block| block.variables.get(AQI_VAR))
            .and_then(|values| values.last().copied().flatten());
        Ok(latest.unwrap_or(f64::NAN))
    }

    /// Daily precipitation over the last 30 days.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_rain_history(&self, coords: Coordinates) -> Result<RainHistory, WeatherError> {
        let mut query = coord_query(coords);
        query.push(("daily", RAIN_VAR.to_string()));
        query.push(("past_days", RAIN_PAST_DAYS.to_string()));
        query.push(("forecast_days", "0".to_string()));
        query.push(("timezone", "UTC".to_string()));

        let resp: SeriesResponse = self
            .get_json("rain history", &self.endpoints.forecast, &query)
            .await?;

        let daily = resp
            .daily
            .and_then(|mut block| block.variables.remove(RAIN_VAR))
            .unwrap_or_default();
        Ok(RainHistory::from_daily(daily))
    }
}

fn coord_query(coords: Coordinates) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", coords.latitude.to_string()),
        ("longitude", coords.longitude.to_string()),
    ]
}

/// Open-Meteo sends local ISO times without seconds.
fn parse_local_time(raw: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| WeatherError::Parse(format!("bad time '{}': {}", raw, e)))
}
