use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Map defaults (initial marker position, zoom, ring radius)
    #[serde(default)]
    pub map: MapConfig,

    /// Chart window and history settings
    #[serde(default)]
    pub chart: ChartConfig,

    /// Upstream endpoints
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP API binds to
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub default_lat: f64,
    pub default_lon: f64,
    pub zoom: f64,
    /// Radius of the ring drawn around the marker, in miles
    pub ring_radius_miles: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_lat: 42.68405,
            default_lon: -70.89926,
            zoom: 12.0,
            ring_radius_miles: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Days of history before today on the date axis
    pub past_days: u32,
    /// Days of forecast, today included
    pub forecast_days: u32,
    /// Oldest year the year slider can reach
    pub earliest_year: i32,
    /// Number of previous years drawn by default
    pub default_years: u32,
    pub default_metric: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            past_days: 20,
            forecast_days: 10,
            earliest_year: 2000,
            default_years: 5,
            default_metric: "temp_2m".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub forecast_url: String,
    pub archive_url: String,
    pub elevation_url: String,
    pub air_quality_url: String,
    pub geocode_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            elevation_url: "https://api.open-meteo.com/v1/elevation".to_string(),
            air_quality_url: "https://air-quality-api.open-meteo.com/v1/air-quality".to_string(),
            geocode_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating a default file if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating a default file if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Wrote default config to {}", config_path.display());
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(config_path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.bind.parse::<SocketAddr>().is_err() {
            result.add_error(
                "server.bind",
                format!("Not a socket address: {}", self.server.bind),
            );
        }

        if !(-90.0..=90.0).contains(&self.map.default_lat) {
            result.add_error("map.default_lat", "Latitude must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.map.default_lon) {
            result.add_error("map.default_lon", "Longitude must be within [-180, 180]");
        }
        if !(0.0..=22.0).contains(&self.map.zoom) {
            result.add_warning("map.zoom", "Zoom outside the usual 0-22 range");
        }
        if self.map.ring_radius_miles <= 0.0 {
            result.add_error("map.ring_radius_miles", "Ring radius must be positive");
        }

        if self.chart.past_days + self.chart.forecast_days == 0 {
            result.add_error("chart", "Date window is empty");
        }
        if self.chart.past_days > 92 {
            result.add_error("chart.past_days", "Forecast endpoint allows at most 92 past days");
        }
        if self.chart.forecast_days > 16 {
            result.add_error(
                "chart.forecast_days",
                "Forecast endpoint allows at most 16 forecast days",
            );
        }
        if self.chart.earliest_year < 1940 {
            result.add_warning(
                "chart.earliest_year",
                "Archive data starts in 1940; older years will fail",
            );
        }

        self.validate_url(&self.api.forecast_url, "api.forecast_url", &mut result);
        self.validate_url(&self.api.archive_url, "api.archive_url", &mut result);
        self.validate_url(&self.api.elevation_url, "api.elevation_url", &mut result);
        self.validate_url(&self.api.air_quality_url, "api.air_quality_url", &mut result);
        self.validate_url(&self.api.geocode_url, "api.geocode_url", &mut result);

        if self.api.timeout_secs == 0 {
            result.add_error("api.timeout_secs", "Timeout must be greater than 0");
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            result.add_warning(
                "retry.initial_delay_ms",
                "Initial delay exceeds max delay; every retry waits max_delay_ms",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the given path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("wxmap");

        Ok(config_dir.join("config.toml"))
    }
}
