//! Boundary band: restrict visible-spectrum edges to the neighborhood of
//! the thermal mask.
//!
//! Edges anywhere else in the visible frame (foliage, terrain texture) are
//! discarded. The band is measured in pixels, independent of altitude.

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::distance_transform::euclidean_squared_distance_transform;
use imageproc::edges::canny;
use log::debug;

use crate::bitmap::foreground_count;
use crate::config::FusionConfig;
use crate::error::FusionError;

/// Cells whose Euclidean distance to the nearest mask foreground cell is at
/// most `half_width`. Foreground cells themselves have distance 0.
///
/// An all-background mask produces an all-background band.
pub fn boundary_band(mask: &GrayImage, half_width: f64) -> GrayImage {
    let (w, h) = mask.dimensions();
    if foreground_count(mask) == 0 {
        return GrayImage::new(w, h);
    }
    let dist_sq = euclidean_squared_distance_transform(mask);
    let limit_sq = half_width * half_width;
    ImageBuffer::from_fn(w, h, |x, y| {
        if dist_sq.get_pixel(x, y).0[0] <= limit_sq {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Pixelwise AND of two binary images of equal size.
pub fn intersect(a: &GrayImage, b: &GrayImage) -> GrayImage {
    ImageBuffer::from_fn(a.width(), a.height(), |x, y| {
        if a.get_pixel(x, y).0[0] > 0 && b.get_pixel(x, y).0[0] > 0 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Keep only the edge pixels that fall inside the band.
pub fn gate_edges(edges: &GrayImage, band: &GrayImage) -> GrayImage {
    intersect(edges, band)
}

/// Canny edges of the visible frame, gated to the band around `mask`.
///
/// Returns `(gated_edges, band)`.
pub fn edges_in_band(
    visible: &RgbImage,
    mask: &GrayImage,
    config: &FusionConfig,
) -> Result<(GrayImage, GrayImage), FusionError> {
    if visible.width() == 0 || visible.height() == 0 {
        return Err(FusionError::EmptyFrame("visible"));
    }
    let gray = image::imageops::grayscale(visible);
    let band = boundary_band(mask, config.band_px());
    let edges = canny(&gray, config.canny_low, config.canny_high);
    let gated = gate_edges(&edges, &band);
    debug!(
        "band: {} px in band, {} edge px, {} gated",
        foreground_count(&band),
        foreground_count(&edges),
        foreground_count(&gated)
    );
    Ok((gated, band))
}
