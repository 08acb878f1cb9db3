//! Error types for fence construction and lookups.

use thiserror::Error;

/// Errors that can occur while building fences or classifying points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeofenceError {
    /// Boundary polyline too short to describe a fence.
    #[error("boundary needs at least 4 points, got {count}")]
    InsufficientPoints { count: usize },

    /// Boundary point that is not a finite lon/lat within range.
    #[error("boundary point {index} ({lon}, {lat}) is not a valid coordinate")]
    InvalidBoundary { index: usize, lon: f64, lat: f64 },

    /// Every boundary segment was too short to produce a sample.
    #[error("boundary produced no fence samples")]
    EmptyFence,

    /// Bearing requested for a point that coincides with the reference.
    #[error("bearing is undefined for a point at the reference")]
    DegenerateBearing,

    /// No location with this id.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// A location with this id is already registered.
    #[error("duplicate location: {0}")]
    DuplicateLocation(String),

    /// Thresholds or reference point rejected.
    #[error("invalid location profile: {0}")]
    InvalidProfile(String),

    #[error("location index {0} out of range")]
    LocationIndexOutOfRange(usize),

    #[error("fence index {0} out of range")]
    FenceIndexOutOfRange(usize),

    /// Location has no fence registered.
    #[error("no fence registered for location: {0}")]
    NoFence(String),
}

/// Result type for geofence operations.
pub type Result<T> = std::result::Result<T, GeofenceError>;
