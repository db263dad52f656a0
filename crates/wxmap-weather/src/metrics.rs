//! Catalog of chart metrics and how each one is read from an Open-Meteo response.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{DailySeries, WeatherError};

/// Where a metric's values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    /// Mean of the daily max and min variables.
    DailyMidrange {
        max: &'static str,
        min: &'static str,
    },
    /// A daily variable taken as-is.
    Daily(&'static str),
    /// An hourly variable averaged per calendar day.
    Hourly(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartMetric {
    #[serde(rename = "temp_2m")]
    Temperature,
    #[serde(rename = "relhum_2m")]
    RelativeHumidity,
    #[serde(rename = "soiltemp_0")]
    SoilTemperature,
    #[serde(rename = "soilmstr_0_1")]
    SoilMoisture,
}

impl ChartMetric {
    pub const ALL: [ChartMetric; 4] = [
        Self::Temperature,
        Self::RelativeHumidity,
        Self::SoilTemperature,
        Self::SoilMoisture,
    ];

    /// Identifier used in cache keys and query strings
    pub fn id(&self) -> &'static str {
        match self {
            Self::Temperature => "temp_2m",
            Self::RelativeHumidity => "relhum_2m",
            Self::SoilTemperature => "soiltemp_0",
            Self::SoilMoisture => "soilmstr_0_1",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Temperature => "Mean Temperature (°C)",
            Self::RelativeHumidity => "Rel. Humidity (%)",
            Self::SoilTemperature => "Soil Temperature (°C)",
            Self::SoilMoisture => "Soil Moisture (%)",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Self::Temperature | Self::SoilTemperature => "°C",
            Self::RelativeHumidity | Self::SoilMoisture => "%",
        }
    }

    /// Line colour of the current year
    pub fn color(&self) -> &'static str {
        match self {
            Self::Temperature | Self::SoilTemperature => "#007bff",
            Self::RelativeHumidity | Self::SoilMoisture => "#00b894",
        }
    }

    pub fn source(&self) -> MetricSource {
        match self {
            Self::Temperature => MetricSource::DailyMidrange {
                max: "temperature_2m_max",
                min: "temperature_2m_min",
            },
            Self::RelativeHumidity => MetricSource::Daily("relative_humidity_2m_mean"),
            Self::SoilTemperature => MetricSource::Hourly("soil_temperature_0cm"),
            Self::SoilMoisture => MetricSource::Hourly("soil_moisture_0_1cm"),
        }
    }

    pub fn is_hourly(&self) -> bool {
        matches!(self.source(), MetricSource::Hourly(_))
    }

    /// The `daily=` or `hourly=` query parameter for this metric.
    pub fn query_param(&self) -> (&'static str, String) {
        match self.source() {
            MetricSource::DailyMidrange { max, min } => ("daily", format!("{},{}", max, min)),
            MetricSource::Daily(var) => ("daily", var.to_string()),
            MetricSource::Hourly(var) => ("hourly", var.to_string()),
        }
    }

    /// Reduce a response to one value per day.
    pub fn extract(&self, response: &SeriesResponse) -> Result<DailySeries, WeatherError> {
        match self.source() {
            MetricSource::DailyMidrange { max, min } => {
                let block = response.block("daily")?;
                let dates = block.dates()?;
                let max = block.variable(max)?;
                let min = block.variable(min)?;
                let values = (0..dates.len())
                    .map(|i| match (value_at(max, i), value_at(min, i)) {
                        (Some(hi), Some(lo)) => Some((hi + lo) / 2.0),
                        _ => None,
                    })
                    .collect();
                Ok(DailySeries { dates, values })
            }
            MetricSource::Daily(var) => {
                let block = response.block("daily")?;
                let dates = block.dates()?;
                let raw = block.variable(var)?;
                let values = (0..dates.len()).map(|i| value_at(raw, i)).collect();
                Ok(DailySeries { dates, values })
            }
            MetricSource::Hourly(var) => {
                let block = response.block("hourly")?;
                daily_means(&block.time, block.variable(var)?)
            }
        }
    }
}

impl fmt::Display for ChartMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ChartMetric {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| WeatherError::UnknownMetric(s.to_string()))
    }
}

/// Catalog entry for clients building a metric picker
#[derive(Debug, Clone, Serialize)]
pub struct MetricInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub units: &'static str,
    pub color: &'static str,
    pub hourly: bool,
}

impl From<ChartMetric> for MetricInfo {
    fn from(metric: ChartMetric) -> Self {
        Self {
            id: metric.id(),
            label: metric.label(),
            units: metric.units(),
            color: metric.color(),
            hourly: metric.is_hourly(),
        }
    }
}

pub fn catalog() -> Vec<MetricInfo> {
    ChartMetric::ALL.into_iter().map(MetricInfo::from).collect()
}

/// The `daily` / `hourly` part of a forecast or archive response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesResponse {
    pub daily: Option<SeriesBlock>,
    pub hourly: Option<SeriesBlock>,
}

impl SeriesResponse {
    fn block(&self, name: &str) -> Result<&SeriesBlock, WeatherError> {
        let block = match name {
            "daily" => self.daily.as_ref(),
            _ => self.hourly.as_ref(),
        };
        block.ok_or_else(|| WeatherError::Parse(format!("response has no {} block", name)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesBlock {
    pub time: Vec<String>,
    #[serde(flatten)]
    pub variables: HashMap<String, Vec<Option<f64>>>,
}

impl SeriesBlock {
    fn variable(&self, name: &str) -> Result<&[Option<f64>], WeatherError> {
        self.variables
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| WeatherError::Parse(format!("missing variable {}", name)))
    }

    fn dates(&self) -> Result<Vec<NaiveDate>, WeatherError> {
        self.time.iter().map(|t| parse_day(t)).collect()
    }
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Accepts `2025-07-15` and `2025-07-15T13:00`.
fn parse_day(timestamp: &str) -> Result<NaiveDate, WeatherError> {
    let day = timestamp.get(..10).unwrap_or(timestamp);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| WeatherError::Parse(format!("bad date '{}': {}", timestamp, e)))
}

/// Group hourly values by calendar day, in first-seen order, ignoring nulls.
pub fn daily_means(times: &[String], values: &[Option<f64>]) -> Result<DailySeries, WeatherError> {
    let mut series = DailySeries::default();
    let mut sums: Vec<(f64, u32)> = Vec::new();

    for (i, timestamp) in times.iter().enumerate() {
        let day = parse_day(timestamp)?;
        if series.dates.last() != Some(&day) {
            series.dates.push(day);
            sums.push((0.0, 0));
        }
        if let (Some(v), Some(acc)) = (value_at(values, i), sums.last_mut()) {
            acc.0 += v;
            acc.1 += 1;
        }
    }

    series.values = sums
        .into_iter()
        .map(|(sum, n)| (n > 0).then(|| sum / f64::from(n)))
        .collect();
    Ok(series)
}
