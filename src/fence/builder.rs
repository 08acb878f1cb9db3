//! Builds a polar fence from a boundary polyline around a reference point.

use geo::{Coord, Line, LineString};
use tracing::{debug, info, warn};

use super::spherical;
use crate::error::{GeofenceError, Result};
use crate::models::{Fold, PolarFence, PolarSample, ReferencePoint};

/// Spacing between interpolated fence samples, in degrees (~220 m at the equator)
pub const GEO_RES_DEG: f64 = 0.002;

/// Fewest boundary points that can describe a fence
pub const MIN_BOUNDARY_POINTS: usize = 4;

/// Result of a fence build together with its diagnostics
#[derive(Debug, Clone)]
pub struct FenceReport {
    pub fence: PolarFence,
    /// Direction reversals found in the samples, in generation order
    pub folds: Vec<Fold>,
}

/// Build the polar fence for `boundary` as seen from `reference`.
pub fn build_fence(boundary: &LineString<f64>, reference: ReferencePoint) -> Result<PolarFence> {
    build_fence_with_report(boundary, reference).map(|report| report.fence)
}

/// Build the polar fence and keep the fold diagnostics.
///
/// The boundary must go around the reference in a single rotational
/// direction. It is not closed automatically: repeat the first point at the
/// end for a closed ring. Folds are logged and reported but never change the
/// returned fence.
pub fn build_fence_with_report(
    boundary: &LineString<f64>,
    reference: ReferencePoint,
) -> Result<FenceReport> {
    let count = boundary.0.len();
    if count < MIN_BOUNDARY_POINTS {
        return Err(GeofenceError::InsufficientPoints { count });
    }

    if let Some((index, coord)) = boundary
        .0
        .iter()
        .enumerate()
        .find(|(_, c)| !is_valid_coord(c))
    {
        return Err(GeofenceError::InvalidBoundary {
            index,
            lon: coord.x,
            lat: coord.y,
        });
    }

    let origin = reference.coord();
    let mut samples = Vec::new();

    for (segment_index, segment) in boundary.lines().enumerate() {
        densify_segment(segment_index, segment, origin, &mut samples)?;
    }

    let folds = detect_folds(&samples);
    if !folds.is_empty() {
        warn!(
            "Fence around ({}, {}) folds {} time(s): {:?}",
            reference.lon,
            reference.lat,
            folds.len(),
            folds
        );
    }

    let fence = PolarFence::from_samples(samples)?;

    info!(
        "Built fence around ({}, {}) with {} samples from {} boundary points",
        reference.lon,
        reference.lat,
        fence.len(),
        count
    );

    Ok(FenceReport { fence, folds })
}

/// Append evenly spaced samples along one segment, excluding its end point.
fn densify_segment(
    segment_index: usize,
    segment: Line<f64>,
    origin: Coord<f64>,
    samples: &mut Vec<PolarSample>,
) -> Result<()> {
    let delta = segment.delta();
    let num_samples = (delta.x.abs() + delta.y.abs()) / GEO_RES_DEG;

    // Short segments contribute nothing
    if num_samples < 2.0 {
        debug!(
            "Segment {} too short ({:.2} samples), skipping",
            segment_index, num_samples
        );
        return Ok(());
    }

    let step = Coord {
        x: delta.x / num_samples,
        y: delta.y / num_samples,
    };
    let steps = num_samples.trunc() as usize;

    debug!(
        "Segment {}: {} samples, step ({}, {})",
        segment_index, steps, step.x, step.y
    );

    for sample_index in 0..steps {
        let k = sample_index as f64;
        let coord = Coord {
            x: segment.start.x + step.x * k,
            y: segment.start.y + step.y * k,
        };

        let bearing = spherical::bearing(coord, origin)?;
        let radius = spherical::distance(coord, origin);

        samples.push(PolarSample {
            segment_index,
            sample_index,
            bearing_deg: round_bearing(bearing),
            radius_m: radius.round(),
        });
    }

    Ok(())
}

/// Finite longitude in [-180, 180] and latitude in [-90, 90]
fn is_valid_coord(coord: &Coord<f64>) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}

/// Round to 0.1 degree, folding 360.0 back onto 0.0.
fn round_bearing(bearing: f64) -> f64 {
    let rounded = (bearing * 10.0).round() / 10.0;
    if rounded >= 360.0 {
        rounded - 360.0
    } else {
        rounded
    }
}

/// Find reversals of the sweep direction in samples kept in generation order.
///
/// Bearings should keep increasing (or decreasing) along the boundary. A jump
/// of 180 degrees or more is the sweep crossing 0/360, not a reversal.
pub fn detect_folds(samples: &[PolarSample]) -> Vec<Fold> {
    let mut folds = Vec::new();
    if samples.len() < 2 {
        return folds;
    }

    let initial = wrap_delta(samples[1].bearing_deg - samples[0].bearing_deg);
    let mut direction = if initial < 0.0 { -1.0 } else { 1.0 };

    for pair in samples.windows(2).skip(1) {
        let delta = pair[1].bearing_deg - pair[0].bearing_deg;
        if delta == 0.0 || delta.abs() >= 180.0 {
            continue;
        }

        if delta.signum() != direction {
            direction = -direction;
            folds.push(Fold {
                segment_index: pair[1].segment_index,
                sample_index: pair[1].sample_index,
                bearing_deg: pair[1].bearing_deg,
                bearing_delta: delta,
            });
        }
    }

    folds
}

/// Map a bearing difference into (-180, 180].
fn wrap_delta(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta <= -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(points.to_vec())
    }

    /// Square of half-width 0.5 degree around the origin, counter-clockwise
    fn square() -> LineString<f64> {
        ring(&[
            (0.5, -0.5),
            (0.5, 0.5),
            (-0.5, 0.5),
            (-0.5, -0.5),
            (0.5, -0.5),
        ])
    }

    fn origin() -> ReferencePoint {
        ReferencePoint::new(0.0, 0.0)
    }

    #[test]
    fn test_insufficient_points() {
        let boundary = ring(&[(0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)]);
        let err = build_fence(&boundary, origin()).unwrap_err();
        assert_eq!(err, GeofenceError::InsufficientPoints { count: 3 });
    }

    #[test]
    fn test_square_fence_is_sorted_and_dense() {
        let fence = build_fence(&square(), origin()).unwrap();

        // Each 1 degree side gives ~500 samples
        assert!(fence.len() >= 4 * 499, "only {} samples", fence.len());

        let samples = fence.samples();
        for pair in samples.windows(2) {
            assert!(pair[0].bearing_deg <= pair[1].bearing_deg);
        }
        for sample in samples {
            assert!((0.0..360.0).contains(&sample.bearing_deg));
            assert!(sample.radius_m >= 0.0);
        }
    }

    #[test]
    fn test_samples_are_rounded() {
        let fence = build_fence(&square(), origin()).unwrap();
        for sample in fence.samples() {
            assert_eq!(sample.radius_m, sample.radius_m.round());
            let tenths = sample.bearing_deg * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_square_radius_range() {
        let fence = build_fence(&square(), origin()).unwrap();
        let half_width = 0.5 * spherical::METERS_PER_DEGREE;
        let corner = half_width * std::f64::consts::SQRT_2;
        for sample in fence.samples() {
            assert!(sample.radius_m >= half_width.round() - 1.0);
            assert!(sample.radius_m <= corner.round() + 1.0);
        }
    }

    #[test]
    fn test_square_has_no_folds() {
        let report = build_fence_with_report(&square(), origin()).unwrap();
        assert!(report.folds.is_empty(), "unexpected folds: {:?}", report.folds);
    }

    #[test]
    fn test_clockwise_square_has_no_folds() {
        let mut points = square().0;
        points.reverse();
        let report = build_fence_with_report(&LineString::new(points), origin()).unwrap();
        assert!(report.folds.is_empty(), "unexpected folds: {:?}", report.folds);
    }

    #[test]
    fn test_doubling_back_is_reported_as_folds() {
        // Second segment dips towards the reference, sweeping backwards
        let boundary = ring(&[
            (0.1, -0.1),
            (0.1, 0.1),
            (0.05, 0.02),
            (-0.1, 0.1),
            (-0.1, -0.1),
            (0.1, -0.1),
        ]);
        let report = build_fence_with_report(&boundary, origin()).unwrap();

        assert_eq!(report.folds.len(), 2, "folds: {:?}", report.folds);
        assert_eq!(report.folds[0].segment_index, 1);
        assert!(report.folds[0].bearing_delta < 0.0);
        assert_eq!(report.folds[1].segment_index, 2);
        assert!(report.folds[1].bearing_delta > 0.0);

        // Folds do not stop the build
        let samples = report.fence.samples();
        assert!(samples.windows(2).all(|p| p[0].bearing_deg <= p[1].bearing_deg));
    }

    #[test]
    fn test_nan_boundary_point_rejected() {
        let boundary = ring(&[
            (0.5, -0.5),
            (f64::NAN, 0.5),
            (-0.5, 0.5),
            (-0.5, -0.5),
            (0.5, -0.5),
        ]);
        let err = build_fence(&boundary, origin()).unwrap_err();
        assert!(matches!(err, GeofenceError::InvalidBoundary { index: 1, .. }));
    }

    #[test]
    fn test_infinite_boundary_point_rejected() {
        let boundary = ring(&[
            (0.5, -0.5),
            (0.5, 0.5),
            (-0.5, f64::INFINITY),
            (-0.5, -0.5),
            (0.5, -0.5),
        ]);
        let err = build_fence(&boundary, origin()).unwrap_err();
        assert!(matches!(err, GeofenceError::InvalidBoundary { index: 2, .. }));
    }

    #[test]
    fn test_out_of_range_boundary_point_rejected() {
        let boundary = ring(&[
            (0.5, -0.5),
            (1e7, 0.5),
            (-0.5, 0.5),
            (-0.5, -0.5),
            (0.5, -0.5),
        ]);
        let err = build_fence(&boundary, origin()).unwrap_err();
        assert!(matches!(err, GeofenceError::InvalidBoundary { index: 1, .. }));
    }

    #[test]
    fn test_short_segments_are_skipped() {
        // Tiny detour of 0.001 degree between the first two points
        let boundary = ring(&[
            (0.5, -0.5),
            (0.5, -0.499),
            (0.5, 0.5),
            (-0.5, 0.5),
            (-0.5, -0.5),
            (0.5, -0.5),
        ]);
        let fence = build_fence(&boundary, origin()).unwrap();
        assert!(fence.samples().iter().all(|s| s.segment_index != 0));
    }

    #[test]
    fn test_all_short_segments_is_empty_fence() {
        let boundary = ring(&[(0.001, 0.0), (0.0, 0.001), (-0.001, 0.0), (0.0, -0.001)]);
        assert_eq!(
            build_fence(&boundary, origin()).unwrap_err(),
            GeofenceError::EmptyFence
        );
    }

    #[test]
    fn test_boundary_through_reference_is_degenerate() {
        let boundary = ring(&[(0.0, 0.0), (0.5, 0.0), (0.5, 0.5), (0.0, 0.5)]);
        assert_eq!(
            build_fence(&boundary, origin()).unwrap_err(),
            GeofenceError::DegenerateBearing
        );
    }

    #[test]
    fn test_segment_excludes_end_point() {
        let boundary = ring(&[(0.01, -0.01), (0.01, 0.01), (-0.01, 0.01), (-0.01, -0.01)]);
        let fence = build_fence(&boundary, origin()).unwrap();
        // 0.02 / 0.002 = 10 samples per side, three sides
        let per_segment = |i: usize| {
            fence
                .samples()
                .iter()
                .filter(|s| s.segment_index == i)
                .count()
        };
        for i in 0..3 {
            let n = per_segment(i);
            assert!(n == 9 || n == 10, "segment {} has {} samples", i, n);
        }
        let max_index = fence.samples().iter().map(|s| s.sample_index).max().unwrap();
        assert!(max_index < 10);
    }

    #[test]
    fn test_irregular_site_boundary() {
        let boundary = ring(&[
            (103.7631237, 1.2943612),
            (103.7582241, 1.2943511),
            (103.7484394, 1.2807933),
            (103.7853538, 1.2544169),
            (103.796898, 1.2742389),
            (103.7837659, 1.2790013),
            (103.7817918, 1.2822621),
            (103.7784873, 1.2862951),
            (103.7759553, 1.28814),
            (103.7744104, 1.2866813),
            (103.7667285, 1.290843),
            (103.7631237, 1.2943612),
        ]);
        let report = build_fence_with_report(&boundary, ReferencePoint::new(103.772, 1.275))
            .unwrap();

        let samples = report.fence.samples();
        assert!(samples.len() > 50);
        assert!(samples.windows(2).all(|p| p[0].bearing_deg <= p[1].bearing_deg));
        // Site spans a few kilometers
        assert!(samples.iter().all(|s| s.radius_m > 0.0 && s.radius_m < 5_000.0));
    }

    #[test]
    fn test_detect_folds_ignores_wrap_around() {
        let bearings = [350.0, 355.0, 359.9, 0.0, 5.0, 10.0];
        let samples: Vec<PolarSample> = bearings
            .iter()
            .enumerate()
            .map(|(i, b)| PolarSample {
                segment_index: 0,
                sample_index: i,
                bearing_deg: *b,
                radius_m: 100.0,
            })
            .collect();
        assert!(detect_folds(&samples).is_empty());
    }

    #[test]
    fn test_detect_folds_initial_wrap_sets_direction() {
        let bearings = [359.9, 0.1, 0.3, 0.2];
        let samples: Vec<PolarSample> = bearings
            .iter()
            .enumerate()
            .map(|(i, b)| PolarSample {
                segment_index: 0,
                sample_index: i,
                bearing_deg: *b,
                radius_m: 100.0,
            })
            .collect();
        let folds = detect_folds(&samples);
        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].sample_index, 3);
    }

    #[test]
    fn test_round_bearing_wraps_full_circle() {
        assert_eq!(round_bearing(359.96), 0.0);
        assert_eq!(round_bearing(12.34), 12.3);
        assert_eq!(round_bearing(0.05), 0.1);
    }
}
