//! Ring normalization: simplify, repair degenerate results, quantize.
//!
//! Douglas-Peucker can collapse a small or thin ring down to its two
//! endpoints. A closed boundary needs [`Ring::MIN_POINTS`] points, so
//! collapsed rings are replaced by a coarse sample of the original:
//!
//! ```text
//! original[0], original[n / 3], original[2n / 3], original[0]
//! ```
//!
//! The sample is not checked for collinearity. A pathological input can
//! still yield a zero-area ring; [`RingOutcome::Sampled`] reports it.

use geo::{Area, Coord, LineString};

use crate::simplify::simplify_points;
use crate::types::{Point, Ring, SimplifyConfig};

/// Which path [`normalize_ring`] took to produce its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingOutcome {
    /// Douglas-Peucker output kept at least [`Ring::MIN_POINTS`] points.
    Simplified,
    /// The input was already below [`Ring::MIN_POINTS`] and was only
    /// quantized.
    TooShort,
    /// Simplification collapsed the ring; a 4-point sample of the
    /// original was used instead.
    Sampled {
        /// The sampled ring encloses no area.
        degenerate: bool,
    },
}

/// A normalized ring together with how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRing {
    /// The output ring.
    pub ring: Ring,
    /// Which normalization path produced it.
    pub outcome: RingOutcome,
}

/// Simplify, repair and quantize a single ring.
///
/// The input is not modified. The output never has more points than the
/// input, keeps closure whenever the input was closed, and has at least
/// [`Ring::MIN_POINTS`] points whenever the input did.
#[must_use = "returns the normalized ring"]
pub fn normalize_ring(ring: &Ring, config: &SimplifyConfig) -> NormalizedRing {
    let original = ring.points();
    let simplified = simplify_points(original, config.tolerance);

    let (points, outcome) = if simplified.len() >= Ring::MIN_POINTS {
        (simplified, RingOutcome::Simplified)
    } else if original.len() < Ring::MIN_POINTS {
        (original.to_vec(), RingOutcome::TooShort)
    } else {
        let sample = sample_ring(original);
        (sample, RingOutcome::Sampled { degenerate: false })
    };

    let ring = quantize_ring(&points, config.precision);
    let outcome = match outcome {
        RingOutcome::Sampled { .. } => RingOutcome::Sampled {
            degenerate: enclosed_area(&ring) == 0.0,
        },
        other => other,
    };

    NormalizedRing { ring, outcome }
}

/// Four-point closed sample of `points` at `0`, `n/3`, `2n/3`, `0`.
///
/// Requires `points.len() >= 4`.
fn sample_ring(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    vec![points[0], points[n / 3], points[2 * n / 3], points[0]]
}

/// Unsigned area enclosed by the ring.
fn enclosed_area(ring: &Ring) -> f64 {
    let coords: Vec<Coord> = ring
        .points()
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect();
    geo::Polygon::new(LineString::new(coords), vec![]).unsigned_area()
}

/// Scaled magnitude from which [`quantize`] leaves a value as it is.
///
/// Below 2^50 the round trip `round(v * f) / f * f` lands within a
/// quarter of the rounded integer, so quantizing twice gives the same
/// bits. At or above it `f64` has no finer steps to round to.
const MAX_EXACT_SCALED: f64 = 1_125_899_906_842_624.0;

/// Round `value` to `precision` decimal places, halves away from zero.
///
/// Negative zero is folded into positive zero so that `-0.04` at one
/// decimal place is written as `0`, not `-0`.
///
/// Values too large to carry `precision` decimal places in an `f64`
/// (including those whose scaled value overflows) are returned
/// unchanged, so a finite input always yields a finite output and
/// `quantize(quantize(v, p), p) == quantize(v, p)` for every `p`.
#[must_use]
pub fn quantize(value: f64, precision: u8) -> f64 {
    let factor = 10_f64.powi(i32::from(precision));
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_SCALED {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Quantize both components of a point.
#[must_use]
pub fn quantize_point(point: Point, precision: u8) -> Point {
    Point::new(quantize(point.x, precision), quantize(point.y, precision))
}

/// Quantize every point of a sequence into a new ring.
#[must_use]
pub fn quantize_ring(points: &[Point], precision: u8) -> Ring {
    points
        .iter()
        .map(|&p| quantize_point(p, precision))
        .collect::<Vec<_>>()
        .into()
}
