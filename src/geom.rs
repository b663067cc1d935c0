//! Shared geometry utilities.

use kurbo::{Point, Vec2};

/// Squared lengths below this treat a segment as a single point.
const DEGENERATE_EPS: f64 = 1e-12;

/// Distance from `p` to the segment `a`→`b`.
///
/// Points whose projection falls before `a` or past `b` measure straight to
/// that endpoint. A zero-length segment falls back to `|p - a|`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let v: Vec2 = b - a;
    let w: Vec2 = p - a;
    let len_sq = v.hypot2();
    if len_sq < DEGENERATE_EPS {
        return w.hypot();
    }
    let c1 = w.dot(v);
    if c1 <= 0.0 {
        return w.hypot();
    }
    if len_sq <= c1 {
        return (p - b).hypot();
    }
    let foot = a + v * (c1 / len_sq);
    (p - foot).hypot()
}

/// Perimeter of a closed polygon, including the closing edge.
pub fn closed_arc_length(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| (points[(i + 1) % n] - points[i]).hypot())
        .sum()
}
