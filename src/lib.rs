//! firefront: paired thermal/visible frames → fire-front polyline.
//!
//! Per frame, a thermal mask is segmented with a temporally stabilized Otsu
//! threshold, visible-spectrum edges are gated to a pixel band around the
//! mask, the dominant boundary contour is traced and simplified, and the
//! resulting polyline is delta-encoded into a compact wire message.
//!
//! # Example
//!
//! ```no_run
//! use firefront::{bitmap, FusionConfig, FusionPipeline, Pose2D};
//! use std::path::Path;
//!
//! let thermal = bitmap::load_frame(Path::new("thermal.png"))?;
//! let visible = bitmap::load_frame(Path::new("visible.png"))?.to_rgb8();
//!
//! let mut pipeline = FusionPipeline::new(FusionConfig::default())?;
//! let result = pipeline.step(&thermal, &visible)?;
//! let message = pipeline.message(&result.polyline, Pose2D::default());
//! println!("{}", message.to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod geom;

pub mod band;
pub mod bitmap;
pub mod config;
pub mod contour;
pub mod error;
pub mod guidance;
pub mod message;
pub mod render;
pub mod simplify;
pub mod stabilize;

// Re-export kurbo so downstream users get the same `Point` type used by
// `FrameResult::polyline`.
pub use kurbo;

pub use config::FusionConfig;
pub use error::FusionError;
pub use geom::{closed_arc_length, point_segment_distance};
pub use message::{FireFrontMessage, PolyDelta, Pose2D};

use image::{DynamicImage, GrayImage, RgbImage};
use kurbo::Point;
use log::info;
use std::time::Instant;

use stabilize::ThresholdStabilizer;

/// Everything one fusion step produces. All grids share the input size.
#[derive(Debug, Clone)]
pub struct FrameResult {
    /// Binary fire mask (0/255).
    pub mask: GrayImage,
    /// Visible edges gated to the band.
    pub edges: GrayImage,
    /// Boundary band around the mask.
    pub band: GrayImage,
    /// Gated edges AND mask rim; diagnostic only.
    pub fused: GrayImage,
    /// Simplified fire-front boundary in pixel coordinates. Empty when no
    /// boundary was found.
    pub polyline: Vec<Point>,
}

/// Per-stream fusion pipeline.
///
/// Holds the threshold stabilizer across frames, so use one instance per
/// independent frame stream. `step` takes `&mut self`; sharing an instance
/// across threads needs external locking.
#[derive(Debug, Clone)]
pub struct FusionPipeline {
    config: FusionConfig,
    stabilizer: ThresholdStabilizer,
}

impl FusionPipeline {
    pub fn new(config: FusionConfig) -> Result<Self, FusionError> {
        config.validate()?;
        let stabilizer = ThresholdStabilizer::new(config.ema_alpha);
        Ok(Self { config, stabilizer })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Current stabilized threshold, once a frame has been processed.
    pub fn stabilized_threshold(&self) -> Option<f64> {
        self.stabilizer.value()
    }

    /// Forget cross-frame state, as if freshly constructed.
    pub fn reset(&mut self) {
        self.stabilizer.reset();
    }

    /// Thermal segmentation: any-depth thermal frame → binary mask.
    pub fn thermal_mask(&mut self, thermal: &DynamicImage) -> Result<GrayImage, FusionError> {
        let gray = bitmap::thermal_to_luma8(thermal)?;
        bitmap::segment_thermal(&gray, &mut self.stabilizer, &self.config)
    }

    /// Band-gated edges of the visible frame. Returns `(gated_edges, band)`.
    pub fn edges_in_band(
        &self,
        visible: &RgbImage,
        mask: &GrayImage,
    ) -> Result<(GrayImage, GrayImage), FusionError> {
        band::edges_in_band(visible, mask, &self.config)
    }

    /// Contour selection and simplification. Returns `(polyline, fused)`.
    pub fn fuse_and_polygonize(
        &self,
        mask: &GrayImage,
        gated_edges: &GrayImage,
    ) -> (Vec<Point>, GrayImage) {
        contour::fuse_and_polygonize(mask, gated_edges, self.config.rdp_epsilon)
    }

    /// Full step: thermal + visible frame → mask, edges, band, polyline.
    ///
    /// Thermal and visible frames must have the same dimensions; this is
    /// not checked.
    pub fn step(
        &mut self,
        thermal: &DynamicImage,
        visible: &RgbImage,
    ) -> Result<FrameResult, FusionError> {
        let t_start = Instant::now();

        let mask = self.thermal_mask(thermal)?;
        let (edges, band) = self.edges_in_band(visible, &mask)?;
        let (polyline, fused) = self.fuse_and_polygonize(&mask, &edges);

        info!(
            "step {}x{}: threshold {:.1}, {} vertices ({}ms)",
            mask.width(),
            mask.height(),
            self.stabilizer.value().unwrap_or_default(),
            polyline.len(),
            t_start.elapsed().as_millis(),
        );

        Ok(FrameResult {
            mask,
            edges,
            band,
            fused,
            polyline,
        })
    }

    /// Wire message for `polyline`, stamped with the current time.
    pub fn message(&self, polyline: &[Point], pose: Pose2D) -> FireFrontMessage {
        self.message_at(message::now_seconds(), polyline, pose)
    }

    /// Wire message for `polyline` with an explicit capture time.
    pub fn message_at(&self, ts: f64, polyline: &[Point], pose: Pose2D) -> FireFrontMessage {
        FireFrontMessage::new(
            ts,
            polyline,
            self.config.gsd,
            self.config.rdp_epsilon,
            pose,
            self.config.quant_scale,
        )
    }
}
