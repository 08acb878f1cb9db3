//! Core data models for the geofence system.

pub mod fence;
pub mod location;

pub use fence::{Fold, PolarFence, PolarSample};
pub use location::{LocationProfile, ReferencePoint};
