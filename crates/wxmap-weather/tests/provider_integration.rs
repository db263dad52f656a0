//! Integration tests for WeatherProvider using wiremock.

use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wxmap_weather::{
    ChartMetric, Coordinates, DateWindow, Endpoints, RetryConfig, WeatherCondition,
    WeatherError, WeatherProvider,
};

fn provider(server: &MockServer, retry: RetryConfig) -> WeatherProvider {
    WeatherProvider::with_endpoints(
        Endpoints::with_base(&server.uri()),
        Duration::from_secs(5),
        retry,
    )
    .unwrap()
}

fn coords() -> Coordinates {
    Coordinates::new(42.68405, -70.89926).unwrap()
}

fn window() -> DateWindow {
    DateWindow::new(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(), 2, 1)
}

#[tokio::test]
async fn test_fetch_current_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "42.68405"))
        .and(query_param("current", "temperature_2m,wind_speed_10m,weather_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "utc_offset_seconds": -14400,
            "current": {
                "time": "2025-07-15T14:30",
                "temperature_2m": 21.4,
                "wind_speed_10m": 11.2,
                "weather_code": 3
            }
        })))
        .mount(&mock_server)
        .await;

    let current = provider(&mock_server, RetryConfig::none())
        .fetch_current(coords())
        .await
        .unwrap();

    assert_eq!(current.temperature_c, 21.4);
    assert_eq!(current.wind_speed_kmh, 11.2);
    assert_eq!(current.utc_offset_seconds, -14400);
    assert_eq!(current.condition(), WeatherCondition::Cloudy);
    assert_eq!(current.time.format("%H:%M").to_string(), "14:30");
}

#[tokio::test]
async fn test_fetch_current_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server, RetryConfig::none())
        .fetch_current(coords())
        .await;

    match result {
        Err(WeatherError::Api { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_current_retries_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": {
                "time": "2025-07-15T14:30",
                "temperature_2m": 18.0,
                "wind_speed_10m": 4.0,
                "weather_code": 0
            }
        })))
        .mount(&mock_server)
        .await;

    let current = provider(&mock_server, RetryConfig::new(2, 1, 5))
        .fetch_current(coords())
        .await
        .unwrap();

    assert_eq!(current.temperature_c, 18.0);
    assert_eq!(current.condition(), WeatherCondition::Clear);
}

#[tokio::test]
async fn test_fetch_current_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server, RetryConfig::none())
        .fetch_current(coords())
        .await;

    assert!(matches!(result, Err(WeatherError::Parse(_))));
}

#[tokio::test]
async fn test_fetch_window_daily_midrange() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("past_days", "2"))
        .and(query_param("forecast_days", "1"))
        .and(query_param("daily", "temperature_2m_max,temperature_2m_min"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily": {
                "time": ["2025-07-13", "2025-07-14", "2025-07-15"],
                "temperature_2m_max": [20.0, 22.0, null],
                "temperature_2m_min": [10.0, 12.0, 14.0]
            }
        })))
        .mount(&mock_server)
        .await;

    let series = provider(&mock_server, RetryConfig::none())
        .fetch_window(ChartMetric::Temperature, coords(), &window())
        .await
        .unwrap();

    assert_eq!(series.dates, window().dates());
    assert_eq!(series.values, vec![Some(15.0), Some(17.0), None]);
}

#[tokio::test]
async fn test_fetch_window_hourly_means() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("hourly", "soil_temperature_0cm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hourly": {
                "time": [
                    "2025-07-13T00:00", "2025-07-13T12:00",
                    "2025-07-14T00:00", "2025-07-14T12:00"
                ],
                "soil_temperature_0cm": [16.0, 24.0, null, 22.0]
            }
        })))
        .mount(&mock_server)
        .await;

    let series = provider(&mock_server, RetryConfig::none())
        .fetch_window(ChartMetric::SoilTemperature, coords(), &window())
        .await
        .unwrap();

    assert_eq!(series.dates.len(), 2);
    assert_eq!(series.values, vec![Some(20.0), Some(22.0)]);
}

#[tokio::test]
async fn test_fetch_archive_uses_shifted_range() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .and(query_param("start_date", "2023-07-13"))
        .and(query_param("end_date", "2023-07-15"))
        .and(query_param("daily", "relative_humidity_2m_mean"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily": {
                "time": ["2023-07-13", "2023-07-14", "2023-07-15"],
                "relative_humidity_2m_mean": [71.0, null, 64.0]
            }
        })))
        .mount(&mock_server)
        .await;

    let values = provider(&mock_server, RetryConfig::none())
        .fetch_archive(ChartMetric::RelativeHumidity, coords(), &window(), 2023)
        .await
        .unwrap();

    assert_eq!(values, vec![Some(71.0), None, Some(64.0)]);
}

#[tokio::test]
async fn test_fetch_elevation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/elevation"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "elevation": [33.0] })),
        )
        .mount(&mock_server)
        .await;

    let elevation = provider(&mock_server, RetryConfig::none())
        .fetch_elevation(coords())
        .await
        .unwrap();

    assert_eq!(elevation, 33.0);
}

#[tokio::test]
async fn test_fetch_elevation_empty_is_nan() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/elevation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let elevation = provider(&mock_server, RetryConfig::none())
        .fetch_elevation(coords())
        .await
        .unwrap();

    assert!(elevation.is_nan());
}

#[tokio::test]
async fn test_fetch_air_quality_takes_latest_hour() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .and(query_param("hourly", "us_aqi"))
        .and(query_param("timezone", "UTC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hourly": {
                "time": ["2025-07-15T13:00", "2025-07-15T14:00"],
                "us_aqi": [38.0, 42.0]
            }
        })))
        .mount(&mock_server)
        .await;

    let aqi = provider(&mock_server, RetryConfig::none())
        .fetch_air_quality(coords())
        .await
        .unwrap();

    assert_eq!(aqi, 42.0);
}

#[tokio::test]
async fn test_fetch_air_quality_null_is_nan() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hourly": { "time": ["2025-07-15T14:00"], "us_aqi": [null] }
        })))
        .mount(&mock_server)
        .await;

    let aqi = provider(&mock_server, RetryConfig::none())
        .fetch_air_quality(coords())
        .await
        .unwrap();

    assert!(aqi.is_nan());
}

#[tokio::test]
async fn test_fetch_rain_history_totals() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("daily", "precipitation_sum"))
        .and(query_param("past_days", "30"))
        .and(query_param("forecast_days", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily": {
                "time": ["2025-07-13", "2025-07-14", "2025-07-15"],
                "precipitation_sum": [4.5, null, 1.5]
            }
        })))
        .mount(&mock_server)
        .await;

    let rain = provider(&mock_server, RetryConfig::none())
        .fetch_rain_history(coords())
        .await
        .unwrap();

    assert_eq!(rain.daily.len(), 3);
    assert_eq!(rain.total, 6.0);
}
