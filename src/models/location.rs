//! Location profiles: the reference point and thresholds of a monitored site.

use geo::{Coord, Point};
use serde::{Deserialize, Serialize};

use crate::error::{GeofenceError, Result};

/// Reference point (lon/lat in degrees) that a fence is expressed around
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub lon: f64,
    pub lat: f64,
}

impl ReferencePoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl From<ReferencePoint> for Coord<f64> {
    fn from(reference: ReferencePoint) -> Self {
        reference.coord()
    }
}

impl From<ReferencePoint> for Point<f64> {
    fn from(reference: ReferencePoint) -> Self {
        Point::new(reference.lon, reference.lat)
    }
}

/// A monitored location with its hysteresis thresholds.
///
/// Fields are private so the tolerance ordering checked in [`LocationProfile::new`]
/// cannot be broken afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct LocationProfile {
    id: String,
    label: String,
    reference: ReferencePoint,
    /// Within this radius (meters) the location counts as nearby
    near_radius_m: f64,
    /// Margin beyond the fence (meters) past which a point is certainly outside
    outside_tolerance_m: f64,
    /// Margin from the fence (meters) below which a point is certainly inside
    inside_tolerance_m: f64,
    /// Index of the fence registered for this location, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    fence_index: Option<usize>,
}

impl LocationProfile {
    /// Create a profile, rejecting thresholds that would break the hysteresis band.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        reference: ReferencePoint,
        near_radius_m: f64,
        outside_tolerance_m: f64,
        inside_tolerance_m: f64,
    ) -> Result<Self> {
        let id = id.into();

        if !reference.lon.is_finite() || !reference.lat.is_finite() {
            return Err(GeofenceError::InvalidProfile(format!(
                "{}: reference point must be finite",
                id
            )));
        }
        if !near_radius_m.is_finite() || near_radius_m < 0.0 {
            return Err(GeofenceError::InvalidProfile(format!(
                "{}: near radius must be a non-negative number, got {}",
                id, near_radius_m
            )));
        }
        if !outside_tolerance_m.is_finite() || !inside_tolerance_m.is_finite() {
            return Err(GeofenceError::InvalidProfile(format!(
                "{}: tolerances must be finite",
                id
            )));
        }
        if inside_tolerance_m >= outside_tolerance_m {
            return Err(GeofenceError::InvalidProfile(format!(
                "{}: inside tolerance ({}) must be below outside tolerance ({})",
                id, inside_tolerance_m, outside_tolerance_m
            )));
        }

        Ok(Self {
            id,
            label: label.into(),
            reference,
            near_radius_m,
            outside_tolerance_m,
            inside_tolerance_m,
            fence_index: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reference(&self) -> ReferencePoint {
        self.reference
    }

    pub fn near_radius_m(&self) -> f64 {
        self.near_radius_m
    }

    pub fn outside_tolerance_m(&self) -> f64 {
        self.outside_tolerance_m
    }

    pub fn inside_tolerance_m(&self) -> f64 {
        self.inside_tolerance_m
    }

    pub fn fence_index(&self) -> Option<usize> {
        self.fence_index
    }

    pub(crate) fn set_fence_index(&mut self, index: Option<usize>) {
        self.fence_index = index;
    }
}
