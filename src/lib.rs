//! Geofence - polar-coordinate geofencing with hysteresis
//!
//! This library builds fences around reference points and classifies GPS
//! fixes as inside, outside or uncertain. Shared by the `fence-check` binary.

pub mod config;
pub mod error;
pub mod fence;
pub mod models;
pub mod registry;

pub use error::{GeofenceError, Result};
pub use fence::{Classification, FenceTracker};
pub use models::{Fold, LocationProfile, PolarFence, PolarSample, ReferencePoint};
pub use registry::{FenceHandle, LocationRegistry};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
