//! Dashboard session: what happens when the marker moves, the year slider
//! changes, or a different chart metric is picked.
//!
//! Concurrent calls are not cancelled or ordered. Whichever call finishes
//! last leaves its position in the session.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::Serialize;
use wxmap_core::{AppError, ChartConfig, Config};

use crate::cache::{ElevationCache, SeriesCache};
use crate::card::Card;
use crate::chart::ChartModel;
use crate::geocode::Geocoder;
use crate::location::Coordinates;
use crate::metrics::ChartMetric;
use crate::provider::WeatherProvider;
use crate::types::{CurrentConditions, WeatherError};
use crate::window::DateWindow;

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub past_days: u32,
    pub forecast_days: u32,
    pub earliest_year: i32,
    pub default_years: u32,
    pub default_metric: ChartMetric,
}

impl DashboardSettings {
    pub fn from_config(chart: &ChartConfig) -> Result<Self, WeatherError> {
        Ok(Self {
            past_days: chart.past_days,
            forecast_days: chart.forecast_days,
            earliest_year: chart.earliest_year,
            default_years: chart.default_years,
            default_metric: chart.default_metric.parse()?,
        })
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            past_days: 20,
            forecast_days: 10,
            earliest_year: 2000,
            default_years: 5,
            default_metric: ChartMetric::Temperature,
        }
    }
}

/// Last position that produced current conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub coords: Coordinates,
    pub temperature_c: f64,
}

#[derive(Debug)]
struct Session {
    last: Option<Position>,
    years_back: u32,
    metric: ChartMetric,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub card: Card,
    pub current: Option<CurrentConditions>,
    pub chart: Option<ChartModel>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    provider: WeatherProvider,
    geocoder: Option<Geocoder>,
    series: SeriesCache,
    elevation: ElevationCache,
    settings: DashboardSettings,
    session: Arc<Mutex<Session>>,
    today: Option<NaiveDate>,
}

impl Dashboard {
    pub fn new(provider: WeatherProvider, settings: DashboardSettings) -> Self {
        let session = Session {
            last: None,
            years_back: settings.default_years,
            metric: settings.default_metric,
        };
        Self {
            provider,
            geocoder: None,
            series: SeriesCache::new(),
            elevation: ElevationCache::new(),
            settings,
            session: Arc::new(Mutex::new(session)),
            today: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let provider = WeatherProvider::new(&config.api, &config.retry)?;
        let settings = DashboardSettings::from_config(&config.chart)?;
        Ok(Self::new(provider, settings).with_geocoder(Geocoder::new(&config.api)?))
    }

    pub fn with_geocoder(mut self, geocoder: Geocoder) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Pin the reference date instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn provider(&self) -> &WeatherProvider {
        &self.provider
    }

    pub fn series_cache(&self) -> &SeriesCache {
        &self.series
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(
            self.today(),
            self.settings.past_days,
            self.settings.forecast_days,
        )
    }

    /// Upper bound of the year slider
    pub fn years_available(&self) -> u32 {
        self.window().available_years(self.settings.earliest_year)
    }

    pub fn years_back(&self) -> u32 {
        self.session.lock().years_back
    }

    pub fn metric(&self) -> ChartMetric {
        self.session.lock().metric
    }

    pub fn last_position(&self) -> Option<Position> {
        self.session.lock().last
    }

    /// Chart for an arbitrary position, filling the series cache as needed.
    /// Does not touch the session.
    pub async fn chart(
        &self,
        metric: ChartMetric,
        coords: Coordinates,
        years_back: u32,
        current_temp_c: Option<f64>,
    ) -> Result<ChartModel, WeatherError> {
        let window = self.window();
        let years_back = years_back.min(self.years_available());
        let series = self
            .series
            .ensure(&self.provider, metric, coords, &window, years_back)
            .await?;
        Ok(ChartModel::build(
            metric,
            &series,
            window.reference,
            years_back,
            current_temp_c,
        ))
    }

    /// Refresh the card and chart for a new marker position.
    ///
    /// Current conditions come first; elevation, air quality, rain, place name and
    /// the chart are then fetched concurrently. Each failure is logged and leaves
    /// its placeholder. No chart is drawn when current conditions fail.
    pub async fn handle_position(&self, coords: Coordinates) -> DashboardView {
        let mut card = Card::placeholder(coords);

        let current = match self.provider.fetch_current(coords).await {
            Ok(current) => {
                card.set_current(&current);
                self.session.lock().last = Some(Position {
                    coords,
                    temperature_c: current.temperature_c,
                });
                Some(current)
            }
            Err(e) => {
                tracing::error!("Weather fetch failed for {}: {}", coords, e);
                card.set_current_unavailable(AppError::from(e).user_message());
                None
            }
        };

        let (metric, years_back) = {
            let session = self.session.lock();
            (session.metric, session.years_back)
        };

        let chart = async {
            let temperature = match &current {
                Some(current) => current.temperature_c,
                None => return None,
            };
            match self.chart(metric, coords, years_back, Some(temperature)).await {
                Ok(chart) => Some(chart),
                Err(e) => {
                    tracing::warn!("Chart for {} failed: {}", coords, e);
                    None
                }
            }
        };
        let place = async {
            match &self.geocoder {
                Some(geocoder) => geocoder.reverse(coords).await,
                None => None,
            }
        };

        let (elevation, aqi, rain, place, chart) = tokio::join!(
            self.elevation.get_or_fetch(&self.provider, coords),
            self.provider.fetch_air_quality(coords),
            self.provider.fetch_rain_history(coords),
            place,
            chart,
        );

        match elevation {
            Ok(metres) => card.set_elevation(metres),
            Err(e) => tracing::warn!("Elevation fetch failed: {}", e),
        }
        match aqi {
            Ok(value) => card.set_air_quality(value),
            Err(e) => tracing::warn!("Air quality fetch failed: {}", e),
        }
        match rain {
            Ok(history) => card.set_rain(&history),
            Err(e) => tracing::warn!("Rain history fetch failed: {}", e),
        }
        card.place = place;

        DashboardView {
            card,
            current,
            chart,
        }
    }

    /// Move the year slider. Redraws for the last position, if there is one.
    pub async fn set_years(&self, years_back: u32) -> Result<Option<ChartModel>, WeatherError> {
        let years_back = years_back.min(self.years_available());
        self.session.lock().years_back = years_back;
        self.redraw().await
    }

    /// Switch the chart metric. Redraws for the last position, if there is one.
    pub async fn set_metric(&self, metric: ChartMetric) -> Result<Option<ChartModel>, WeatherError> {
        self.session.lock().metric = metric;
        self.redraw().await
    }

    async fn redraw(&self) -> Result<Option<ChartModel>, WeatherError> {
        let (last, metric, years_back) = {
            let session = self.session.lock();
            (session.last, session.metric, session.years_back)
        };
        match last {
            Some(position) => {
                let chart = self
                    .chart(
                        metric,
                        position.coords,
                        years_back,
                        Some(position.temperature_c),
                    )
                    .await?;
                Ok(Some(chart))
            }
            None => Ok(None),
        }
    }
}
