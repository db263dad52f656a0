//! HTTP API for the weather map
//!
//! Serves current conditions, the dashboard card, chart data and overlay
//! geometry as JSON under `/map/api`.

pub mod routes;

use std::future::Future;
use std::net::SocketAddr;

use wxmap_core::{Config, MapConfig};
use wxmap_weather::{Coordinates, Dashboard, WeatherError};

pub use routes::routes;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: warp::Error,
    },
    #[error(transparent)]
    Weather(#[from] WeatherError),
}

/// Shared state handed to every request
#[derive(Debug, Clone)]
pub struct ServerState {
    pub dashboard: Dashboard,
    /// Used when a request omits `lat` or `lng`
    pub default_location: Coordinates,
    pub default_zoom: f64,
    pub ring_radius_miles: f64,
}

impl ServerState {
    pub fn new(dashboard: Dashboard, map: &MapConfig) -> Result<Self, WeatherError> {
        Ok(Self {
            dashboard,
            default_location: Coordinates::new(map.default_lat, map.default_lon)?,
            default_zoom: map.zoom,
            ring_radius_miles: map.ring_radius_miles,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        Self::new(Dashboard::from_config(config)?, &config.map)
    }
}

/// Serve the API on `addr` until `shutdown` resolves.
pub async fn serve<F>(state: ServerState, addr: SocketAddr, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|source| ServerError::Bind { addr, source })?;

    tracing::info!("Listening on http://{}", bound);
    server.await;
    tracing::info!("Server stopped");
    Ok(())
}
