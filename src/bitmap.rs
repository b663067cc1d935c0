use std::path::Path;

use image::{DynamicImage, GrayImage, ImageBuffer, ImageReader, Luma, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};
use log::debug;

use crate::config::FusionConfig;
use crate::error::FusionError;
use crate::stabilize::ThresholdStabilizer;

/// Reduce a thermal frame of any supported depth to 8-bit luma.
///
/// 16-bit luma is rescaled linearly by 255/65535. Float images hold samples
/// in 0.0..=1.0; they are scaled by 255 and clamped. Anything else goes
/// through the usual luma conversion. Dynamic range lost here is not
/// recovered.
pub fn thermal_to_luma8(frame: &DynamicImage) -> Result<GrayImage, FusionError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(FusionError::EmptyFrame("thermal"));
    }
    let gray = match frame {
        DynamicImage::ImageLuma8(img) => img.clone(),
        DynamicImage::ImageLuma16(img) => rescale_luma16(img),
        DynamicImage::ImageLumaA16(_) => rescale_luma16(&frame.to_luma16()),
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            let luma = frame.to_luma32f();
            ImageBuffer::from_fn(luma.width(), luma.height(), |x, y| {
                let v = luma.get_pixel(x, y).0[0] * 255.0;
                Luma([v.round().clamp(0.0, 255.0) as u8])
            })
        }
        other => other.to_luma8(),
    };
    Ok(gray)
}

/// Decode a frame from disk, keeping its native bit depth.
pub fn load_frame(path: &Path) -> Result<DynamicImage, FusionError> {
    let load_err =
        |e: &dyn std::fmt::Display| FusionError::ImageLoad(format!("{}: {}", path.display(), e));
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| load_err(&e))?
        .decode()
        .map_err(|e| load_err(&e))
}

/// Linear 16→8 bit rescale with rounding.
pub fn rescale_luma16(img: &ImageBuffer<Luma<u16>, Vec<u16>>) -> GrayImage {
    let k = 255.0 / 65535.0;
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        Luma([(img.get_pixel(x, y).0[0] as f64 * k).round() as u8])
    })
}

/// Thermal proxy for streams without a thermal camera: HSV value channel,
/// i.e. `max(r, g, b)` per pixel.
pub fn value_channel(rgb: &RgbImage) -> GrayImage {
    ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([r.max(g).max(b)])
    })
}

/// Segment a thermal frame into a binary fire mask.
///
/// Foreground (fire) pixels are 255, background pixels are 0. The Otsu
/// level is smoothed by `stabilizer` before binarizing, then the mask is
/// opened and closed twice with a disk of radius
/// [`FusionConfig::morph_radius`].
pub fn segment_thermal(
    gray: &GrayImage,
    stabilizer: &mut ThresholdStabilizer,
    config: &FusionConfig,
) -> Result<GrayImage, FusionError> {
    if gray.width() == 0 || gray.height() == 0 {
        return Err(FusionError::EmptyFrame("thermal"));
    }

    let raw = otsu_level(gray);
    let smoothed = stabilizer.update(raw as f64);
    let level = smoothed.round().clamp(0.0, 255.0) as u8;
    debug!("thermal threshold: otsu {} -> stabilized {:.2} (cut {})", raw, smoothed, level);

    let binary = threshold(gray, level, ThresholdType::Binary);

    let r = config.morph_radius();
    let mask = open(&binary, Norm::L2, r);
    let mask = close(&mask, Norm::L2, r);
    // Second pass fills small interior holes left by the first.
    Ok(close(&mask, Norm::L2, r))
}

/// Count foreground pixels of a binary image.
pub fn foreground_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p.0[0] > 0).count()
}
