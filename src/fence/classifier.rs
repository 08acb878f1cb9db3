//! Three-state inside/outside classification against a polar fence.

use geo::Point;
use serde::Serialize;
use tracing::debug;

use super::{query, spherical};
use crate::models::{LocationProfile, PolarFence};

/// Where a point lies relative to a location's fence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Inside,
    Outside,
    /// Within the hysteresis band around the fence
    Uncertain,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Inside => write!(f, "inside"),
            Classification::Outside => write!(f, "outside"),
            Classification::Uncertain => write!(f, "uncertain"),
        }
    }
}

/// Position of a point relative to the reference point and the fence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FenceMeasurement {
    pub bearing_deg: f64,
    pub distance_m: f64,
    pub fence_radius_m: f64,
    /// Signed distance beyond the fence; negative means inside it
    pub margin_m: f64,
}

/// Measure `point` against the fence of `location`.
///
/// A point sitting exactly on the reference has no bearing; it is measured
/// at bearing 0, which only affects which fence radius it is compared with.
pub fn measure(
    point: Point<f64>,
    location: &LocationProfile,
    fence: &PolarFence,
) -> FenceMeasurement {
    let reference = location.reference().coord();

    let bearing_deg = spherical::bearing(point.0, reference).unwrap_or(0.0);
    let distance_m = spherical::distance(point.0, reference);
    let fence_radius_m = query::radius_at(fence, bearing_deg);
    let margin_m = distance_m - fence_radius_m;

    debug!(
        "{}: point ({}, {}) bearing={:.1} distance={:.0} fence={:.0} margin={:.1}",
        location.id(),
        point.x(),
        point.y(),
        bearing_deg,
        distance_m,
        fence_radius_m,
        margin_m
    );

    FenceMeasurement {
        bearing_deg,
        distance_m,
        fence_radius_m,
        margin_m,
    }
}

/// Classify `point` as inside, outside or uncertain for `location`.
pub fn classify(
    point: Point<f64>,
    location: &LocationProfile,
    fence: &PolarFence,
) -> Classification {
    classify_margin(measure(point, location, fence).margin_m, location)
}

/// Apply the hysteresis band of `location` to a signed fence margin.
pub fn classify_margin(margin_m: f64, location: &LocationProfile) -> Classification {
    if margin_m > location.outside_tolerance_m() {
        Classification::Outside
    } else if margin_m < location.inside_tolerance_m() {
        Classification::Inside
    } else {
        Classification::Uncertain
    }
}

/// Cheap circular pre-filter, independent of the fence.
pub fn is_near(location: &LocationProfile, point: Point<f64>) -> bool {
    let distance = spherical::distance(point.0, location.reference().coord());
    debug!(
        "{}: distance {:.0} m, near radius {:.0} m",
        location.id(),
        distance,
        location.near_radius_m()
    );
    distance <= location.near_radius_m()
}
