//! Wire message for the guidance link.
//!
//! ```json
//! {"ts": 1700000000.5, "gsd": 0.2, "eps": 1.0,
//!  "pose": {"x": 0.0, "y": 0.0, "yaw": 0.0},
//!  "poly": {"k": 3, "d": [1000, 2000, 50, 0, 0, -75], "scale": 100.0},
//!  "crc": 0}
//! ```
//!
//! `poly.d` holds the first quantized point verbatim, then per-point
//! `(dx, dy)` deltas, flattened in x,y order. An empty polyline encodes as
//! `{"k": 0, "d": []}` with no `scale` key. `crc` is reserved and always 0;
//! consumers must not validate against it.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::error::FusionError;

/// Vehicle pose in the guidance frame. `yaw` is in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }
}

/// Delta-encoded polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyDelta {
    /// Point count.
    pub k: usize,
    /// Absolute first point, then deltas, as flat x,y pairs.
    pub d: Vec<i64>,
    /// Quantization factor. Absent for empty polylines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl PolyDelta {
    /// Reconstruct the quantized points by cumulative summation.
    pub fn decode(&self) -> Vec<(i64, i64)> {
        let mut points = Vec::with_capacity(self.k);
        let mut acc = (0i64, 0i64);
        for pair in self.d.chunks_exact(2) {
            acc = (acc.0 + pair[0], acc.1 + pair[1]);
            points.push(acc);
        }
        points
    }

    /// Decoded points mapped back to pixel units.
    pub fn decode_points(&self) -> Vec<Point> {
        let scale = self.scale.unwrap_or(1.0);
        self.decode()
            .into_iter()
            .map(|(x, y)| Point::new(x as f64 / scale, y as f64 / scale))
            .collect()
    }
}

/// Quantize a point to integer units of `1 / scale` pixels.
pub fn quantize(p: Point, scale: f64) -> (i64, i64) {
    ((p.x * scale).round() as i64, (p.y * scale).round() as i64)
}

/// Delta-encode a polyline with quantization factor `scale`.
pub fn delta_encode(points: &[Point], scale: f64) -> PolyDelta {
    if points.is_empty() {
        return PolyDelta { k: 0, d: Vec::new(), scale: None };
    }
    let mut d = Vec::with_capacity(points.len() * 2);
    let mut prev = (0i64, 0i64);
    for &p in points {
        let q = quantize(p, scale);
        d.push(q.0 - prev.0);
        d.push(q.1 - prev.1);
        prev = q;
    }
    PolyDelta { k: points.len(), d, scale: Some(scale) }
}

/// One fire-front message, emitted per processed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireFrontMessage {
    /// Capture time, seconds since the Unix epoch.
    pub ts: f64,
    /// Ground sample distance (m/px), informational.
    pub gsd: f64,
    /// Simplification tolerance in pixels.
    pub eps: f64,
    pub pose: Pose2D,
    pub poly: PolyDelta,
    /// Reserved integrity field; always 0.
    pub crc: u32,
}

impl FireFrontMessage {
    pub fn new(
        ts: f64,
        polyline: &[Point],
        gsd: f64,
        eps: f64,
        pose: Pose2D,
        quant_scale: f64,
    ) -> Self {
        Self {
            ts,
            gsd,
            eps,
            pose,
            poly: delta_encode(polyline, quant_scale),
            crc: 0,
        }
    }

    /// Compact single-line JSON.
    pub fn to_json(&self) -> Result<String, FusionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, FusionError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Current wall-clock time in seconds since the Unix epoch.
pub fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Write a message as JSON, creating parent directories.
pub fn export_message_json(path: &Path, message: &FireFrontMessage) -> Result<(), FusionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, message.to_json()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_first_point_then_deltas() {
        let pts = [Point::new(10.0, 20.0), Point::new(10.5, 20.0), Point::new(10.5, 19.25)];
        let enc = delta_encode(&pts, 100.0);
        assert_eq!(enc.k, 3);
        assert_eq!(enc.d, vec![1000, 2000, 50, 0, 0, -75]);
        assert_eq!(enc.scale, Some(100.0));
    }

    #[test]
    fn round_trips_quantized_points() {
        let pts: Vec<Point> = (0..25)
            .map(|i| Point::new(3.0 * i as f64 + 0.123, 40.0 - (i * i) as f64 * 0.37))
            .collect();
        let enc = delta_encode(&pts, 100.0);
        let expected: Vec<(i64, i64)> = pts.iter().map(|&p| quantize(p, 100.0)).collect();
        assert_eq!(enc.decode(), expected);
    }

    #[test]
    fn empty_polyline_wire_form() {
        let msg = FireFrontMessage::new(12.5, &[], 0.2, 1.0, Pose2D::default(), 100.0);
        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(json["poly"], serde_json::json!({"k": 0, "d": []}));
        assert_eq!(json["crc"], 0);
    }

    #[test]
    fn field_names_and_order() {
        let msg = FireFrontMessage::new(
            1.0,
            &[Point::new(1.0, 2.0)],
            0.2,
            1.0,
            Pose2D::new(3.0, 4.0, 0.5),
            100.0,
        );
        assert_eq!(
            msg.to_json().unwrap(),
            r#"{"ts":1.0,"gsd":0.2,"eps":1.0,"pose":{"x":3.0,"y":4.0,"yaw":0.5},"poly":{"k":1,"d":[100,200],"scale":100.0},"crc":0}"#
        );
    }

    #[test]
    fn parses_back() {
        let pts = [Point::new(5.0, 5.0), Point::new(7.0, 1.0)];
        let msg = FireFrontMessage::new(99.0, &pts, 0.3, 2.0, Pose2D::default(), 100.0);
        let back = FireFrontMessage::from_json(&msg.to_json().unwrap()).unwrap();
        assert_eq!(back, msg);
        assert_eq!(back.poly.decode_points(), pts.to_vec());
    }
}
