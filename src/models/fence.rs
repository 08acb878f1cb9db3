//! Polar fence types produced by the fence builder.

use serde::Serialize;

use crate::error::{GeofenceError, Result};

/// One densified boundary point expressed relative to the reference point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolarSample {
    /// Index of the boundary segment this sample was taken from
    pub segment_index: usize,
    /// Position of the sample within its segment
    pub sample_index: usize,
    /// Bearing from the reference point, rounded to 0.1 degree, in [0, 360)
    pub bearing_deg: f64,
    /// Distance from the reference point, rounded to the meter
    pub radius_m: f64,
}

/// A fence boundary as a non-empty list of polar samples sorted by bearing.
///
/// Bearings may repeat. Immutable once built, so it can be shared freely
/// between threads.
#[derive(Debug, Clone, Serialize)]
pub struct PolarFence {
    samples: Vec<PolarSample>,
}

impl PolarFence {
    /// Build a fence from samples in any order.
    ///
    /// Samples are stable-sorted by bearing, so equal bearings keep their
    /// original order.
    pub fn from_samples(mut samples: Vec<PolarSample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(GeofenceError::EmptyFence);
        }
        samples.sort_by(|a, b| a.bearing_deg.total_cmp(&b.bearing_deg));
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[PolarSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Never true for a built fence
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &PolarSample {
        &self.samples[0]
    }

    pub fn last(&self) -> &PolarSample {
        &self.samples[self.samples.len() - 1]
    }

    /// Estimated fence distance from the reference point at `bearing_deg`
    pub fn radius_at(&self, bearing_deg: f64) -> f64 {
        crate::fence::radius_at(self, bearing_deg)
    }
}

/// Place where the sweep direction of the samples reversed.
///
/// A fold means the boundary doubles back on itself as seen from the
/// reference point, so radius is no longer a function of bearing there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fold {
    pub segment_index: usize,
    pub sample_index: usize,
    pub bearing_deg: f64,
    pub bearing_delta: f64,
}
