//! Tangent-follow guidance stub.
//!
//! Not part of the fusion pipeline; consumes its polyline the way the
//! downstream controller would.

use kurbo::Point;

use crate::message::Pose2D;

/// Cruise speed used by the CLI when following a front.
pub const DEFAULT_SPEED: f64 = 5.0;

/// Heading (radians) and speed toward the fire front.
///
/// Finds the vertex nearest the pose and heads along the segment that
/// leaves it (the last vertex reuses itself, giving heading 0). With fewer
/// than two vertices the pose's yaw is held at zero speed.
pub fn tangent_follow(polyline: &[Point], pose: Pose2D, speed: f64) -> (f64, f64) {
    if polyline.len() < 2 {
        return (pose.yaw, 0.0);
    }
    let here = Point::new(pose.x, pose.y);
    let mut nearest = 0;
    let mut best = f64::INFINITY;
    for (i, &p) in polyline.iter().enumerate() {
        let d2 = (p - here).hypot2();
        if d2 < best {
            best = d2;
            nearest = i;
        }
    }
    let next = (nearest + 1).min(polyline.len() - 1);
    let seg = polyline[next] - polyline[nearest];
    (seg.y.atan2(seg.x), speed)
}
