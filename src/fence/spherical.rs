//! Flat-earth distance and bearing between nearby coordinates.
//!
//! Treats a degree of longitude and a degree of latitude as the same length.
//! Good enough for fences spanning a few kilometers; no latitude correction.

use geo::Coord;

use crate::error::{GeofenceError, Result};

/// Earth mean radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Conversion from a coordinate difference in degrees to meters
pub const METERS_PER_DEGREE: f64 = std::f64::consts::PI / 180.0 * EARTH_RADIUS_M;

/// Approximate distance in meters from `reference` to `point`
pub fn distance(point: Coord<f64>, reference: Coord<f64>) -> f64 {
    let lon_delta = point.x - reference.x;
    let lat_delta = point.y - reference.y;
    lon_delta.hypot(lat_delta) * METERS_PER_DEGREE
}

/// Direction of `point` as seen from `reference`, in degrees within [0, 360).
///
/// 0 is due east (positive longitude) and angles grow towards north.
/// Fails with [`GeofenceError::DegenerateBearing`] when both coincide.
pub fn bearing(point: Coord<f64>, reference: Coord<f64>) -> Result<f64> {
    let lon_delta = point.x - reference.x;
    let lat_delta = point.y - reference.y;

    if lon_delta == 0.0 {
        return if lat_delta > 0.0 {
            Ok(90.0)
        } else if lat_delta < 0.0 {
            Ok(270.0)
        } else {
            Err(GeofenceError::DegenerateBearing)
        };
    }

    let deg = (lat_delta / lon_delta).atan().to_degrees();

    // atan only covers quadrants 1 and 4
    let deg = if lon_delta < 0.0 {
        180.0 + deg
    } else if lat_delta < 0.0 {
        360.0 + deg
    } else {
        deg
    };

    // 360 + (-tiny) rounds up to 360 in f64
    if deg >= 360.0 {
        Ok(deg - 360.0)
    } else {
        Ok(deg)
    }
}
