//! Geometry of the ring drawn around the map marker.

use serde::Serialize;

/// Equatorial circumference used by Web Mercator, in metres
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;
const METRES_PER_MILE: f64 = 1609.34;

/// Ground resolution of a 256-px-tile Web Mercator map.
pub fn metres_per_pixel(latitude: f64, zoom: f64) -> f64 {
    EARTH_CIRCUMFERENCE_M * latitude.to_radians().cos().abs() / 2f64.powf(zoom + 8.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingGeometry {
    pub metres_per_pixel: f64,
    pub pixels_per_mile: f64,
    /// Point size handed to the renderer
    pub size_px: f64,
}

impl RingGeometry {
    pub fn new(latitude: f64, zoom: f64, radius_miles: f64) -> Self {
        let metres_per_pixel = metres_per_pixel(latitude, zoom);
        let pixels_per_mile = METRES_PER_MILE / metres_per_pixel;
        Self {
            metres_per_pixel,
            pixels_per_mile,
            size_px: radius_miles * pixels_per_mile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_zoom_zero() {
        let mpp = metres_per_pixel(0.0, 0.0);
        assert!((mpp - 156_543.033_9).abs() < 1e-3);
    }

    #[test]
    fn test_each_zoom_level_halves_resolution() {
        let a = metres_per_pixel(42.68, 12.0);
        let b = metres_per_pixel(42.68, 13.0);
        assert!((a / b - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ring_scales_with_radius() {
        let one = RingGeometry::new(42.68, 12.0, 1.0);
        let ten = RingGeometry::new(42.68, 12.0, 10.0);
        assert!((ten.size_px - 10.0 * one.size_px).abs() < 1e-9);
        assert!((one.size_px - one.pixels_per_mile).abs() < 1e-12);
    }
}
