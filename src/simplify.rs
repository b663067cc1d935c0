//! Ramer–Douglas–Peucker polyline simplification in pixel space.
//!
//! Distances are measured to the chord *segment*, not the infinite line,
//! so points that overshoot an endpoint are kept when they stray too far
//! from it.

use kurbo::Point;

use crate::geom::point_segment_distance;

/// Simplify `points` so that every dropped point lies within `epsilon`
/// of the chord that replaced it.
///
/// Sequences shorter than three points are returned unchanged. On ties the
/// first farthest point is used as the split.
///
/// Recurses once per split, so stack depth grows with the number of
/// retained vertices (at most `points.len()` on pathological input).
/// Single-contour polylines stay far below any stack limit.
pub fn rdp(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let start = points[0];
    let end = points[points.len() - 1];

    let mut dmax = 0.0;
    let mut index = 0;
    for (i, &p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let d = point_segment_distance(p, start, end);
        if d > dmax {
            dmax = d;
            index = i;
        }
    }

    if dmax > epsilon {
        let mut left = rdp(&points[..=index], epsilon);
        let right = rdp(&points[index..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![start, end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic wiggly outline: a sine wave with a bit of saw noise.
    fn wiggle(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                let y = 12.0 * (x / 9.0).sin() + ((i * 7) % 5) as f64 * 0.4;
                Point::new(x, y)
            })
            .collect()
    }

    #[test]
    fn short_inputs_pass_through() {
        assert!(rdp(&[], 1.0).is_empty());
        let two = [Point::new(0.0, 0.0), Point::new(3.0, 3.0)];
        assert_eq!(rdp(&two, 1.0), two.to_vec());
    }

    #[test]
    fn collinear_collapses_to_endpoints() {
        let line: Vec<Point> = (0..50).map(|i| Point::new(i as f64, 2.0 * i as f64)).collect();
        for eps in [1e-6, 0.5, 10.0] {
            assert_eq!(rdp(&line, eps), vec![line[0], line[49]]);
        }
    }

    #[test]
    fn keeps_a_corner() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
        ];
        assert_eq!(
            rdp(&pts, 1.0),
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
        );
    }

    #[test]
    fn is_a_fixed_point() {
        let pts = wiggle(200);
        for eps in [0.5, 1.0, 3.0] {
            let once = rdp(&pts, eps);
            assert_eq!(rdp(&once, eps), once);
        }
    }

    #[test]
    fn dropped_points_stay_within_tolerance() {
        let pts = wiggle(300);
        let eps = 1.5;
        let simplified = rdp(&pts, eps);

        // Output is an ordered subsequence of the input; walk both together.
        let mut cursor = 0;
        for pair in simplified.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            while pts[cursor] != a {
                cursor += 1;
            }
            let mut j = cursor + 1;
            while pts[j] != b {
                assert!(point_segment_distance(pts[j], a, b) <= eps);
                j += 1;
            }
            cursor = j;
        }
    }

    #[test]
    fn point_count_is_bounded() {
        for n in 2..40 {
            let pts = wiggle(n);
            let out = rdp(&pts, 0.8);
            assert!(out.len() <= pts.len());
            assert!(out.len() >= 2);
            assert_eq!(out.first(), pts.first());
            assert_eq!(out.last(), pts.last());
        }
    }

    #[test]
    fn long_contour_simplifies_without_overflow() {
        // Roughly the rim length of a frame-filling fire in a 1080p image.
        let pts = wiggle(5_000);
        let out = rdp(&pts, 0.5);
        assert!(out.len() >= 2 && out.len() <= pts.len());
        assert_eq!(out.first(), pts.first());
        assert_eq!(out.last(), pts.last());
    }

    #[test]
    fn degenerate_closed_chord_uses_radial_distance() {
        // Start and end coincide: the farthest point from that spot splits.
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 0.0),
        ];
        assert_eq!(
            rdp(&pts, 1.0),
            vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
                Point::new(0.0, 0.0)
            ]
        );
    }
}
