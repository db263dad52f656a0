//! Route tests using warp::test against a wiremock upstream.

use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wxmap_core::MapConfig;
use wxmap_server::{routes, ServerState};
use wxmap_weather::{
    ChartMetric, Dashboard, DashboardSettings, Endpoints, RetryConfig, WeatherProvider,
};

fn state(server: &MockServer) -> ServerState {
    let provider = WeatherProvider::with_endpoints(
        Endpoints::with_base(&server.uri()),
        Duration::from_secs(5),
        RetryConfig::none(),
    )
    .unwrap();
    let settings = DashboardSettings {
        past_days: 2,
        forecast_days: 1,
        earliest_year: 2000,
        default_years: 1,
        default_metric: ChartMetric::Temperature,
    };
    let dashboard = Dashboard::new(provider, settings)
        .with_today(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap());
    ServerState::new(dashboard, &MapConfig::default()).unwrap()
}

fn json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

async fn mount_current(server: &MockServer, latitude: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", latitude))
        .and(query_param("current", "temperature_2m,wind_speed_10m,weather_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "utc_offset_seconds": 0,
            "current": {
                "time": "2025-07-15T14:30",
                "temperature_2m": 19.5,
                "wind_speed_10m": 7.0,
                "weather_code": 2
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_current_with_coordinates() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, "51.5").await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .method("GET")
        .path("/map/api?lat=51.5&lng=-0.12")
        .reply(&filter)
        .await;

    assert_eq!(resp.status(), 200);
    let body = json(resp.body());
    assert_eq!(body["temperature_c"], 19.5);
    assert_eq!(body["wind_speed_kmh"], 7.0);
    assert_eq!(body["weather_code"], 2);
}

#[tokio::test]
async fn test_current_defaults_missing_coordinates() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, "42.68405").await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), 200);

    let resp = warp::test::request()
        .path("/map/api?lat=&lng=")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_current_invalid_coordinates() {
    let mock_server = MockServer::start().await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api?lat=abc&lng=10")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), 400);
    assert_eq!(json(resp.body())["error"], "Invalid coordinate: not a number");

    let resp = warp::test::request()
        .path("/map/api?lat=10&lng=181")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), 400);
    assert_eq!(json(resp.body())["error"], "Invalid coordinate: out of range");
}

#[tokio::test]
async fn test_current_upstream_failure_is_bad_gateway() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api?lat=10&lng=10")
        .reply(&filter)
        .await;

    assert_eq!(resp.status(), 502);
    let error = json(resp.body())["error"].as_str().unwrap().to_string();
    assert!(error.contains("500"), "unexpected error body: {}", error);
}

#[tokio::test]
async fn test_chart_unknown_metric() {
    let mock_server = MockServer::start().await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api/chart?metric=cloud_cover")
        .reply(&filter)
        .await;

    assert_eq!(resp.status(), 400);
    assert_eq!(json(resp.body())["error"], "Unknown metric 'cloud_cover'");
}

#[tokio::test]
async fn test_chart_invalid_years() {
    let mock_server = MockServer::start().await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api/chart?years=many")
        .reply(&filter)
        .await;

    assert_eq!(resp.status(), 400);
    assert_eq!(json(resp.body())["error"], "Invalid years: many");
}

#[tokio::test]
async fn test_chart_datasets() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("daily", "relative_humidity_2m_mean"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily": {
                "time": ["2025-07-13", "2025-07-14", "2025-07-15"],
                "relative_humidity_2m_mean": [70.0, 72.0, 74.0]
            }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .and(query_param("start_date", "2024-07-13"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily": {
                "time": ["2024-07-13", "2024-07-14", "2024-07-15"],
                "relative_humidity_2m_mean": [60.0, 61.0, 62.0]
            }
        })))
        .mount(&mock_server)
        .await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api/chart?lat=42.7&lng=-70.9&metric=relhum_2m&years=1")
        .reply(&filter)
        .await;

    assert_eq!(resp.status(), 200);
    let body = json(resp.body());
    assert_eq!(body["metric"], "relhum_2m");
    assert_eq!(body["labels"].as_array().unwrap().len(), 3);
    assert_eq!(body["labels"][0], "2025-07-13");
    let datasets = body["datasets"].as_array().unwrap();
    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0]["year"], 2025);
    assert_eq!(datasets[1]["data"][2], 62.0);
    assert_eq!(body["today"]["label"], "Today");
}

#[tokio::test]
async fn test_card_reports_placeholders_on_failure() {
    let mock_server = MockServer::start().await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api/card?lat=10&lng=10")
        .reply(&filter)
        .await;

    assert_eq!(resp.status(), 200);
    let body = json(resp.body());
    assert!(body["current"].is_null());
    assert!(body["chart"].is_null());
    assert_eq!(body["card"]["wind"], "Unable to load data.");
    assert_eq!(body["card"]["aqi"], "U.S. AQI —");
}

#[tokio::test]
async fn test_metrics_catalog() {
    let mock_server = MockServer::start().await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api/metrics")
        .reply(&filter)
        .await;

    assert_eq!(resp.status(), 200);
    let body = json(resp.body());
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["temp_2m", "relhum_2m", "soiltemp_0", "soilmstr_0_1"]);
}

#[tokio::test]
async fn test_overlay_geometry() {
    let mock_server = MockServer::start().await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api/overlay?lat=0&zoom=0")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), 200);
    let mpp = json(resp.body())["metres_per_pixel"].as_f64().unwrap();
    assert!((mpp - 156_543.03).abs() < 0.01);

    let resp = warp::test::request()
        .path("/map/api/overlay?zoom=30")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_unknown_route() {
    let mock_server = MockServer::start().await;
    let filter = routes(state(&mock_server));

    let resp = warp::test::request()
        .path("/map/api/nothing")
        .reply(&filter)
        .await;

    assert_eq!(resp.status(), 404);
    assert_eq!(json(resp.body())["error"], "Not found");
}
