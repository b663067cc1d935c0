//! Human-viewable outputs: overlay image and raw polyline JSON.
//!
//! These consume pipeline results read-only and are not needed for the
//! wire message.

use std::path::Path;

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::error::FusionError;

/// Mask colors, the two ends of a jet colormap.
const MASK_FIRE: [u8; 3] = [128, 0, 0];
const MASK_CLEAR: [u8; 3] = [0, 0, 128];
const MASK_WEIGHT: f32 = 0.4;
const EDGE_WEIGHT: f32 = 0.8;
const BAND_WEIGHT: f32 = 0.3;
const POLY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Blend mask, edges and band onto the visible frame and draw the polyline.
///
/// Layers are added with saturation: mask colorized at 0.4, edges white at
/// 0.8, band white at 0.3. The polyline is drawn two pixels wide in green.
pub fn render_overlay(
    visible: &RgbImage,
    mask: &GrayImage,
    edges: &GrayImage,
    band: &GrayImage,
    polyline: &[Point],
) -> RgbImage {
    let mut overlay = visible.clone();
    for (x, y, px) in overlay.enumerate_pixels_mut() {
        let fire = mask.get_pixel(x, y).0[0] > 0;
        let tint = if fire { MASK_FIRE } else { MASK_CLEAR };
        let edge = edges.get_pixel(x, y).0[0] as f32 * EDGE_WEIGHT;
        let in_band = band.get_pixel(x, y).0[0] as f32 * BAND_WEIGHT;
        for c in 0..3 {
            let v = px.0[c] as f32 + tint[c] as f32 * MASK_WEIGHT + edge + in_band;
            px.0[c] = v.round().min(255.0) as u8;
        }
    }

    for pair in polyline.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
            draw_line_segment_mut(
                &mut overlay,
                (a.x as f32 + dx, a.y as f32 + dy),
                (b.x as f32 + dx, b.y as f32 + dy),
                POLY_COLOR,
            );
        }
    }
    overlay
}

/// Raw simplified point list: `{"k": count, "points": [[x, y], ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineExport {
    pub k: usize,
    pub points: Vec<[f64; 2]>,
}

impl From<&[Point]> for PolylineExport {
    fn from(polyline: &[Point]) -> Self {
        Self {
            k: polyline.len(),
            points: polyline.iter().map(|p| [p.x, p.y]).collect(),
        }
    }
}

/// Write the polyline as pretty JSON, creating parent directories.
pub fn export_polyline_json(path: &Path, polyline: &[Point]) -> Result<(), FusionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&PolylineExport::from(polyline))?;
    std::fs::write(path, json)?;
    Ok(())
}
