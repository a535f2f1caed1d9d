//! Point-to-segment distance.

use crate::types::Point;

/// Distance from `p` to the closed segment `a`-`b`.
///
/// The projection of `p` onto the line through `a` and `b` is clamped to
/// the segment, so points beyond either end measure to that endpoint.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
#[must_use]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let t = dx.mul_add(p.x - a.x, dy * (p.y - a.y)) / length_sq;
    let t = t.clamp(0.0, 1.0);
    let projected = Point::new(t.mul_add(dx, a.x), t.mul_add(dy, a.y));
    p.distance(projected)
}
