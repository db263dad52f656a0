//! Route table and handlers.
//!
//! Caller mistakes answer 400 and upstream failures 502, both with an
//! `{"error": "..."}` body.

use std::collections::HashMap;
use std::convert::Infallible;

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};
use wxmap_core::AppError;
use wxmap_weather::location::{parse_coord, LAT_RANGE};
use wxmap_weather::{catalog, ChartMetric, Coordinates, RingGeometry, WeatherError};

use crate::ServerState;

type Query = HashMap<String, String>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub fn routes(
    state: ServerState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let current = warp::get()
        .and(warp::path!("map" / "api"))
        .and(warp::query::<Query>())
        .and(with_state(state.clone()))
        .and_then(current);

    let card = warp::get()
        .and(warp::path!("map" / "api" / "card"))
        .and(warp::query::<Query>())
        .and(with_state(state.clone()))
        .and_then(card);

    let chart = warp::get()
        .and(warp::path!("map" / "api" / "chart"))
        .and(warp::query::<Query>())
        .and(with_state(state.clone()))
        .and_then(chart);

    let metrics = warp::get()
        .and(warp::path!("map" / "api" / "metrics"))
        .and_then(metrics);

    let overlay = warp::get()
        .and(warp::path!("map" / "api" / "overlay"))
        .and(warp::query::<Query>())
        .and(with_state(state))
        .and_then(overlay);

    current
        .or(card)
        .or(chart)
        .or(metrics)
        .or(overlay)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn with_state(state: ServerState) -> impl Filter<Extract = (ServerState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn coordinates(params: &Query, state: &ServerState) -> Result<Coordinates, WeatherError> {
    Coordinates::from_query(
        params.get("lat").map(String::as_str),
        params.get("lng").map(String::as_str),
        state.default_location,
    )
}

fn json_reply<T: Serialize>(value: &T) -> Response {
    warp::reply::json(value).into_response()
}

fn error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: message.into(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

fn weather_error_reply(err: WeatherError) -> Response {
    let message = err.to_string();
    let app_error = AppError::from(err);
    if app_error.is_client_error() {
        error_reply(StatusCode::BAD_REQUEST, message)
    } else {
        tracing::error!("Upstream failure: {}", app_error);
        error_reply(StatusCode::BAD_GATEWAY, message)
    }
}

/// `GET /map/api?lat=&lng=`: current conditions
async fn current(params: Query, state: ServerState) -> Result<Response, Infallible> {
    let coords = match coordinates(&params, &state) {
        Ok(coords) => coords,
        Err(e) => return Ok(weather_error_reply(e)),
    };

    match state.dashboard.provider().fetch_current(coords).await {
        Ok(current) => Ok(json_reply(&current)),
        Err(e) => Ok(weather_error_reply(e)),
    }
}

/// `GET /map/api/card?lat=&lng=`: moves the dashboard to the position and
/// returns card, current conditions and chart. Partial failures still answer 200.
async fn card(params: Query, state: ServerState) -> Result<Response, Infallible> {
    let coords = match coordinates(&params, &state) {
        Ok(coords) => coords,
        Err(e) => return Ok(weather_error_reply(e)),
    };

    let view = state.dashboard.handle_position(coords).await;
    Ok(json_reply(&view))
}

/// `GET /map/api/chart?lat=&lng=&metric=&years=`
async fn chart(params: Query, state: ServerState) -> Result<Response, Infallible> {
    let coords = match coordinates(&params, &state) {
        Ok(coords) => coords,
        Err(e) => return Ok(weather_error_reply(e)),
    };

    let metric = match params.get("metric").filter(|m| !m.is_empty()) {
        Some(id) => match id.parse::<ChartMetric>() {
            Ok(metric) => metric,
            Err(e) => return Ok(weather_error_reply(e)),
        },
        None => state.dashboard.metric(),
    };

    let years_back = match params.get("years").filter(|y| !y.is_empty()) {
        Some(raw) => match raw.parse::<u32>() {
            Ok(years) => years,
            Err(_) => {
                return Ok(error_reply(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid years: {}", raw),
                ))
            }
        },
        None => state.dashboard.years_back(),
    };

    match state.dashboard.chart(metric, coords, years_back, None).await {
        Ok(chart) => Ok(json_reply(&chart)),
        Err(e) => Ok(weather_error_reply(e)),
    }
}

/// `GET /map/api/metrics`
async fn metrics() -> Result<Response, Infallible> {
    Ok(json_reply(&catalog()))
}

/// `GET /map/api/overlay?lat=&zoom=`: ring size for the marker
async fn overlay(params: Query, state: ServerState) -> Result<Response, Infallible> {
    let latitude = match params.get("lat").filter(|v| !v.is_empty()) {
        Some(raw) => match parse_coord(Some(raw.as_str()), LAT_RANGE.0, LAT_RANGE.1) {
            Ok(lat) => lat,
            Err(e) => return Ok(weather_error_reply(e)),
        },
        None => state.default_location.latitude,
    };

    let zoom = match params.get("zoom").filter(|v| !v.is_empty()) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(zoom) if (0.0..=22.0).contains(&zoom) => zoom,
            _ => {
                return Ok(error_reply(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid zoom: {}", raw),
                ))
            }
        },
        None => state.default_zoom,
    };

    let geometry = RingGeometry::new(latitude, zoom, state.ring_radius_miles);
    Ok(json_reply(&geometry))
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not found"));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
        ));
    }

    tracing::warn!("Unhandled rejection: {:?}", err);
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
    ))
}
