//! Path simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Reduces point count in rings by removing points that are within
//! a given tolerance of the chord between the retained neighbours.
//! Ranges are processed from an explicit work list rather than by
//! recursion, so very long coastlines cannot exhaust the call stack.

use crate::distance::segment_distance;
use crate::types::{Point, Ring};

/// Simplify a single ring using the Ramer-Douglas-Peucker algorithm.
///
/// Points within `tolerance` degrees of the chord between their
/// retained neighbours are removed. A tolerance of 0.0 only removes
/// points lying exactly on the chord.
///
/// Rings with fewer than 3 points are returned unchanged (nothing to
/// simplify). The first and last point are always kept, so a closed
/// ring stays closed.
#[must_use = "returns the simplified ring"]
pub fn simplify(ring: &Ring, tolerance: f64) -> Ring {
    Ring::new(simplify_points(ring.points(), tolerance))
}

/// Simplify an ordered point sequence; see [`simplify`].
#[must_use = "returns the simplified points"]
pub fn simplify_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[last] = true;

    let mut pending = vec![(0, last)];
    while let Some((start, end)) = pending.pop() {
        let Some((max_idx, max_dist)) = farthest_point(points, start, end) else {
            continue;
        };

        if max_dist > tolerance {
            kept[max_idx] = true;
            if max_idx - start > 1 {
                pending.push((start, max_idx));
            }
            if end - max_idx > 1 {
                pending.push((max_idx, end));
            }
        }
    }

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Interior point of `start..=end` farthest from the chord between the
/// endpoints, with its distance. `None` when the range has no interior.
///
/// Ties keep the lowest index.
fn farthest_point(points: &[Point], start: usize, end: usize) -> Option<(usize, f64)> {
    let (a, b) = (points[start], points[end]);
    let mut best: Option<(usize, f64)> = None;

    for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
        let d = segment_distance(p, a, b);
        if best.is_none_or(|(_, max)| d > max) {
            best = Some((i, d));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> Ring {
        Ring::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn empty_ring_unchanged() {
        let result = simplify(&Ring::default(), 1.0);
        assert!(result.is_empty());
    }

    #[test]
    fn single_point_unchanged() {
        let result = simplify(&ring(&[(1.0, 2.0)]), 1.0);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn two_points_unchanged() {
        let result = simplify(&ring(&[(0.0, 0.0), (10.0, 0.0)]), 100.0);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn zero_tolerance_preserves_offset_points() {
        let input = ring(&[(0.0, 0.0), (1.0, 0.1), (2.0, 0.0), (3.0, 0.05), (4.0, 0.0)]);
        let result = simplify(&input, 0.0);
        assert_eq!(result, input);
    }

    #[test]
    fn collinear_points_collapse_to_endpoints() {
        let input = ring(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]);
        let result = simplify(&input, 0.1);
        assert_eq!(result.points(), &[Point::new(0.0, 0.0), Point::new(4.0, 4.0)]);
    }

    #[test]
    fn zigzag_retains_peaks() {
        let input = ring(&[(0.0, 0.0), (2.0, 5.0), (4.0, 0.0), (6.0, 5.0), (8.0, 0.0)]);
        let result = simplify(&input, 1.0);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn large_tolerance_collapses_zigzag() {
        let input = ring(&[(0.0, 0.0), (2.0, 5.0), (4.0, 0.0), (6.0, 5.0), (8.0, 0.0)]);
        let result = simplify(&input, 10.0);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn square_keeps_all_corners() {
        let input = ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]);
        let result = simplify(&input, 0.5);
        assert_eq!(result, input);
    }

    #[test]
    fn near_collinear_noise_is_dropped() {
        let input = ring(&[
            (0.0, 0.0),
            (5.0, 0.01),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let result = simplify(&input, 0.5);
        assert_eq!(
            result,
            ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])
        );
    }

    #[test]
    fn result_is_ordered_subsequence() {
        let input = ring(&[
            (0.0, 0.0),
            (1.0, 3.0),
            (2.0, -1.0),
            (3.0, 4.0),
            (4.0, 0.2),
            (5.0, -3.0),
            (6.0, 0.0),
        ]);
        let result = simplify(&input, 1.5);
        let mut cursor = input.points().iter();
        for p in result.points() {
            assert!(cursor.any(|q| q == p), "{p:?} out of order or missing");
        }
        assert_eq!(result.first(), input.first());
        assert_eq!(result.last(), input.last());
    }

    #[test]
    fn dropped_points_lie_within_tolerance_of_kept_chord() {
        let input = ring(&[
            (0.0, 0.0),
            (1.0, 0.3),
            (2.0, -0.2),
            (3.0, 2.5),
            (4.0, 0.1),
            (5.0, 0.4),
            (6.0, 0.0),
        ]);
        let tolerance = 0.5;
        let result = simplify(&input, tolerance);

        // Every dropped point must be within tolerance of the chord
        // spanning the kept neighbours on either side of it.
        let kept = result.points();
        for window in kept.windows(2) {
            let (a, b) = (window[0], window[1]);
            let start = input.points().iter().position(|&p| p == a).unwrap_or(0);
            let end = input.points().iter().position(|&p| p == b).unwrap_or(0);
            for &p in &input.points()[start + 1..end] {
                let d = segment_distance(p, a, b);
                assert!(d <= tolerance, "dropped {p:?} at distance {d}");
            }
        }
    }

    #[test]
    fn closed_ring_with_coincident_endpoints() {
        // The initial chord has zero length, so distances are measured to
        // the shared start/end point.
        let input = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let result = simplify(&input, 0.1);
        assert_eq!(result, input);
    }

    #[test]
    fn long_ring_does_not_overflow_stack() {
        // A zigzag with equal peaks always splits next to the start, so the
        // split tree is as deep as the ring is long.
        let points: Vec<Point> = (0..10_000_u32)
            .map(|i| Point::new(f64::from(i), f64::from(i % 2)))
            .collect();
        let result = simplify_points(&points, 0.1);
        assert!(result.len() > 2);
        assert!(result.len() <= points.len());
    }

    #[test]
    fn ties_keep_lowest_index() {
        // Both interior points are exactly 1.0 from the chord.
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 1.0),
            Point::new(3.0, 0.0),
        ];
        assert_eq!(farthest_point(&points, 0, 3), Some((1, 1.0)));
    }
}
