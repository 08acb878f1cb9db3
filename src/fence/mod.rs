//! Polar geofence construction and point classification.
//!
//! A fence is stored as (bearing, distance) samples around the location's
//! reference point. Looking up the fence distance in the direction of a
//! point and comparing it with the point's own distance tells whether the
//! point is inside, outside, or too close to the boundary to decide.

mod builder;
mod classifier;
mod query;
pub mod spherical;
mod tracker;

pub use builder::{
    build_fence, build_fence_with_report, detect_folds, FenceReport, GEO_RES_DEG,
    MIN_BOUNDARY_POINTS,
};
pub use classifier::{
    classify, classify_margin, is_near, measure, Classification, FenceMeasurement,
};
pub use query::radius_at;
pub use tracker::{FenceState, FenceTracker, Transition};
