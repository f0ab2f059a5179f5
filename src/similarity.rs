//! Stream similarity in `[0, 1]`: cheap dissimilarity gates followed by a
//! sparsity- and position-weighted error integral over a banded warp path.
//!
//! The gates reject pairs that cannot plausibly describe the same shape
//! before any alignment work happens; everything that passes is scored by
//! integrating a saturating per-pairing error `1 - exp(-(d/D)^2)` along the
//! FastDTW path, where `D` scales with the shorter stream. Each pairing is
//! weighted by the product of both points' density weights and a half-sine
//! positional envelope that de-weights the endpoints, so a noisy tail or a
//! sparsely sampled detour counts for less than a disagreement mid-stream.

use std::f64::consts::PI;

use crate::fast_dtw::fast_warp_summary;
use crate::stream::Stream;

/// Length ratios outside this band are an immediate mismatch.
const MIN_LENGTH_RATIO: f64 = 0.4;
const MAX_LENGTH_RATIO: f64 = 2.5;

/// The distance scale: this fraction of the shorter stream's length.
const DISTANCE_SCALE_FRACTION: f64 = 0.3;

/// Similarity score for two streams, 1 for identical shapes and 0 for
/// unrelated ones.
///
/// Returns 0 without aligning when either stream has fewer than two points,
/// when the Euclidean length ratio falls outside `[0.4, 2.5]`, or when the
/// start, middle, or end points sit further apart than 30% of the shorter
/// length. Otherwise aligns with FastDTW at `radius` and integrates the
/// weighted error along the path. Deterministic for identical inputs.
pub fn similarity(a: &Stream, b: &Stream, radius: usize) -> f64 {
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }
    let length_a = a.euclidean_length();
    let length_b = b.euclidean_length();
    let ratio = length_a / length_b;
    // A NaN ratio (two zero-length streams) fails the containment test and
    // lands in the mismatch branch.
    if !(MIN_LENGTH_RATIO..=MAX_LENGTH_RATIO).contains(&ratio) {
        return 0.0;
    }
    let scale = DISTANCE_SCALE_FRACTION * length_a.min(length_b);
    let probes = [
        (0, 0),
        (a.len() / 2, b.len() / 2),
        (a.len() - 1, b.len() - 1),
    ];
    for (i, j) in probes {
        if a.point(i).dist(&b.point(j)) > scale {
            return 0.0;
        }
    }

    let sparsity_a = a.sparsity();
    let sparsity_b = b.sparsity();
    let summary = fast_warp_summary(a, b, radius);

    let mut total_weight = 0.0;
    let mut total_weighted_error = 0.0;
    for &(i, j) in &summary.index_pairs {
        let unitless = a.point(i).dist(&b.point(j)) / scale;
        let error = 1.0 - (-unitless * unitless).exp();
        let weight = sparsity_a[i]
            * sparsity_b[j]
            * (0.1 + 0.9 * (PI * i as f64 / a.len() as f64).sin())
            * (0.1 + 0.9 * (PI * j as f64 / b.len() as f64).sin());
        total_weight += weight;
        total_weighted_error += error * weight;
    }
    (1.0 - total_weighted_error / total_weight).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_streams_score_one() {
        let a = Stream::from_coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]);
        assert_eq!(similarity(&a, &a, 4), 1.0);
    }

    #[test]
    fn degenerate_streams_score_zero() {
        let a = Stream::from_coords(&[(0.0, 0.0)]);
        let b = Stream::from_coords(&[(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(similarity(&a, &b, 4), 0.0);
        assert_eq!(similarity(&b, &a, 4), 0.0);
    }

    #[test]
    fn mismatched_lengths_short_circuit() {
        // Lengths 1.0 and 3.0: ratio 1/3 falls below the 0.4 floor.
        let a = Stream::from_coords(&[(0.0, 0.0), (1.0, 0.0)]);
        let b = Stream::from_coords(&[(0.0, 0.0), (3.0, 0.0)]);
        assert_eq!(similarity(&a, &b, 4), 0.0);
        assert_eq!(similarity(&b, &a, 4), 0.0);
    }

    #[test]
    fn distant_endpoints_short_circuit() {
        // Same length and shape, but translated far beyond 30% of it.
        let a = Stream::from_coords(&[(0.0, 0.0), (1.0, 0.0)]);
        let b = Stream::from_coords(&[(10.0, 0.0), (11.0, 0.0)]);
        assert_eq!(similarity(&a, &b, 4), 0.0);
    }

    #[test]
    fn coincident_point_streams_score_zero() {
        let a = Stream::from_coords(&[(1.0, 1.0), (1.0, 1.0)]);
        assert_eq!(similarity(&a, &a, 4), 0.0);
    }

    #[test]
    fn a_small_perturbation_scores_high_but_below_identical() {
        let coords: Vec<(f64, f64)> = (0..50)
            .map(|i| (i as f64, (i as f64 * 0.2).sin() * 4.0))
            .collect();
        let a = Stream::from_coords(&coords);
        let nudged: Vec<(f64, f64)> = coords.iter().map(|&(x, y)| (x, y + 0.05)).collect();
        let b = Stream::from_coords(&nudged);
        let score = similarity(&a, &b, 8);
        assert!(score > 0.9 && score < 1.0, "score={}", score);
    }

    proptest! {
        #[test]
        fn scores_stay_in_the_unit_interval(
            a in prop::collection::vec((-20.0f64..20.0, -20.0f64..20.0), 2..30),
            b in prop::collection::vec((-20.0f64..20.0, -20.0f64..20.0), 2..30),
            radius in 0usize..5,
        ) {
            let score = similarity(
                &Stream::from_coords(&a),
                &Stream::from_coords(&b),
                radius,
            );
            prop_assert!((0.0..=1.0).contains(&score), "score={}", score);
        }
    }
}
