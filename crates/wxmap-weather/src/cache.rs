//! In-memory series cache keyed by metric and rounded location.
//!
//! Entries are created on first query and only ever grow while the reference
//! date stays the same. When the date moves on, the entry is rebuilt for the
//! new window. Nothing is evicted.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;

use crate::location::{Coordinates, LocationKey, ELEVATION_KEY_DIGITS};
use crate::metrics::ChartMetric;
use crate::provider::WeatherProvider;
use crate::types::WeatherError;
use crate::window::DateWindow;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub metric: ChartMetric,
    pub location: LocationKey,
}

impl SeriesKey {
    pub fn new(metric: ChartMetric, coords: Coordinates) -> Self {
        Self {
            metric,
            location: LocationKey::rounded(coords),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.metric, self.location)
    }
}

/// Per-year series aligned on a shared date axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearSeries {
    pub dates: Vec<NaiveDate>,
    pub years: BTreeMap<i32, Vec<Option<f64>>>,
}

impl YearSeries {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            years: BTreeMap::new(),
        }
    }

    /// Store `values` for `year`, padded or truncated to the axis length.
    pub fn insert_year(&mut self, year: i32, mut values: Vec<Option<f64>>) {
        values.resize(self.dates.len(), None);
        self.years.insert(year, values);
    }

    pub fn get(&self, year: i32) -> Option<&[Option<f64>]> {
        self.years.get(&year).map(Vec::as_slice)
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years.contains_key(&year)
    }
}

/// A cached entry and the reference date its axis was built for.
#[derive(Debug, Clone)]
struct Entry {
    reference: NaiveDate,
    series: YearSeries,
}

#[derive(Debug, Clone, Default)]
pub struct SeriesCache {
    entries: Arc<Mutex<HashMap<SeriesKey, Entry>>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SeriesKey) -> Option<YearSeries> {
        self.entries.lock().get(key).map(|e| e.series.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Make sure the entry for (`metric`, `coords`) holds the reference year and the
    /// `years_back` years before it, fetching whatever is missing.
    ///
    /// The forecast-window fetch that creates or rebuilds an entry must succeed;
    /// archive years that fail are logged and left out, so a later call retries
    /// them. An entry built for another reference date is replaced.
    pub async fn ensure(
        &self,
        provider: &WeatherProvider,
        metric: ChartMetric,
        coords: Coordinates,
        window: &DateWindow,
        years_back: u32,
    ) -> Result<YearSeries, WeatherError> {
        let key = SeriesKey::new(metric, coords);
        let reference = window.reference;
        let reference_year = window.reference_year();

        let stored = self.entries.lock().get(&key).map(|e| e.reference);
        if stored != Some(reference) {
            let current = provider.fetch_window(metric, coords, window).await?;
            let mut series = YearSeries::new(current.dates);
            series.insert_year(reference_year, current.values);

            let mut entries = self.entries.lock();
            match entries.get(&key).map(|e| e.reference) {
                Some(existing) if existing == reference => {}
                Some(existing) => {
                    tracing::debug!("Rebuilding {} for {} (was {})", key, reference, existing);
                    entries.insert(key.clone(), Entry { reference, series });
                }
                None => {
                    tracing::debug!("Created series cache entry {}", key);
                    entries.insert(key.clone(), Entry { reference, series });
                }
            }
        }

        let missing: Vec<i32> = {
            let entries = self.entries.lock();
            let entry = entries.get(&key);
            (1..=years_back as i32)
                .map(|back| reference_year - back)
                .filter(|year| !entry.is_some_and(|e| e.series.contains(*year)))
                .collect()
        };

        if !missing.is_empty() {
            tracing::debug!("Fetching {} archive years for {}", missing.len(), key);
            let fetches = missing.iter().map(|&year| async move {
                (
                    year,
                    provider.fetch_archive(metric, coords, window, year).await,
                )
            });
            let results = join_all(fetches).await;

            let mut entries = self.entries.lock();
            // Years fetched for an older window would not line up with the new axis
            if let Some(entry) = entries.get_mut(&key).filter(|e| e.reference == reference) {
                for (year, result) in results {
                    match result {
                        Ok(values) => entry.series.insert_year(year, values),
                        Err(e) => {
                            tracing::warn!("Archive fetch for {} in {} failed: {}", key, year, e)
                        }
                    }
                }
            }
        }

        Ok(self.get(&key).unwrap_or_default())
    }
}

/// Elevation lookups bucketed on a three-decimal key.
#[derive(Debug, Clone, Default)]
pub struct ElevationCache {
    entries: Arc<Mutex<HashMap<LocationKey, f64>>>,
}

impl ElevationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// NaN results are returned but not stored.
    pub async fn get_or_fetch(
        &self,
        provider: &WeatherProvider,
        coords: Coordinates,
    ) -> Result<f64, WeatherError> {
        let key = LocationKey::with_precision(coords, ELEVATION_KEY_DIGITS);
        let cached = self.entries.lock().get(&key).copied();
        if let Some(elevation) = cached {
            return Ok(elevation);
        }

        let elevation = provider.fetch_elevation(coords).await?;
        if !elevation.is_nan() {
            self.entries.lock().insert(key, elevation);
        }
        Ok(elevation)
    }
}
