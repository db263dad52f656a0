//! Weather data for the map dashboard
//!
//! Fetches current conditions, forecast windows and archive years from the
//! Open-Meteo APIs, caches per-year series in memory, and shapes them into the
//! card and chart the dashboard renders.

pub mod aqi;
pub mod cache;
pub mod card;
pub mod chart;
pub mod dashboard;
pub mod geocode;
pub mod location;
pub mod metrics;
pub mod overlay;
pub mod provider;
pub mod retry;
pub mod types;
pub mod units;
pub mod window;

pub use aqi::AqiBand;
pub use cache::{ElevationCache, SeriesCache, SeriesKey, YearSeries};
pub use card::Card;
pub use chart::{ChartModel, Dataset, TodayMarker};
pub use dashboard::{Dashboard, DashboardSettings, DashboardView, Position};
pub use geocode::Geocoder;
pub use location::{Coordinates, LocationKey};
pub use metrics::{catalog, ChartMetric, MetricInfo};
pub use overlay::RingGeometry;
pub use provider::{Endpoints, WeatherProvider};
pub use retry::RetryConfig;
pub use types::*;
pub use window::DateWindow;
