//! Radius lookup on a polar fence.

use crate::models::PolarFence;

/// Estimate the fence distance from the reference point at `bearing_deg`.
///
/// Interpolates linearly between the two samples bracketing the bearing.
/// Outside the sampled range the nearest end sample is used as-is: there is
/// no extrapolation and no interpolation across 0/360.
pub fn radius_at(fence: &PolarFence, bearing_deg: f64) -> f64 {
    let samples = fence.samples();

    // First sample with a strictly greater bearing
    let i = samples.partition_point(|s| s.bearing_deg <= bearing_deg);

    if i == 0 {
        return samples[0].radius_m;
    }
    if i == samples.len() {
        return samples[samples.len() - 1].radius_m;
    }

    let before = &samples[i - 1];
    let after = &samples[i];
    let d1 = bearing_deg - before.bearing_deg;
    let d2 = after.bearing_deg - bearing_deg;

    (before.radius_m * d2 + after.radius_m * d1) / (d1 + d2)
}
