use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FusionError;

/// All fusion parameters in one struct.
/// Held immutably for the lifetime of a pipeline; loadable from a JSON preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Ground sample distance in meters per pixel.
    /// Carried into the message only; every threshold below is in pixels.
    pub gsd: f64,

    // -- Segmentation --
    /// Smoothing factor of the threshold stabilizer, in (0, 1].
    /// Higher = follows the per-frame Otsu level faster.
    pub ema_alpha: f64,

    // -- Band / edges --
    /// Half-width of the boundary band in pixels. Also sets the radius of
    /// the morphological cleanup disk.
    pub band_half_width: f64,
    /// Canny low hysteresis threshold.
    pub canny_low: f32,
    /// Canny high hysteresis threshold.
    pub canny_high: f32,

    // -- Polyline --
    /// RDP simplification epsilon in pixels.
    pub rdp_epsilon: f64,
    /// Quantization factor for delta encoding (points are multiplied by this
    /// and rounded).
    pub quant_scale: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            gsd: 0.2,
            ema_alpha: 0.2,
            band_half_width: 3.0,
            canny_low: 50.0,
            canny_high: 150.0,
            rdp_epsilon: 1.0,
            quant_scale: 100.0,
        }
    }
}

impl FusionConfig {
    /// Load a preset from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, FusionError> {
        let data = std::fs::read_to_string(path)?;
        let config: FusionConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), FusionError> {
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(FusionError::InvalidConfig(format!(
                "ema_alpha must be in (0, 1], got {}",
                self.ema_alpha
            )));
        }
        if !(self.rdp_epsilon >= 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "rdp_epsilon must be non-negative, got {}",
                self.rdp_epsilon
            )));
        }
        if !(self.band_half_width > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "band_half_width must be positive, got {}",
                self.band_half_width
            )));
        }
        if !(self.quant_scale > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "quant_scale must be positive, got {}",
                self.quant_scale
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(FusionError::InvalidConfig(format!(
                "canny_low ({}) exceeds canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        Ok(())
    }

    /// Radius of the cleanup disk: the band width rounded, at least 1.
    pub fn morph_radius(&self) -> u8 {
        self.band_half_width.max(1.0).round().clamp(1.0, u8::MAX as f64) as u8
    }

    /// Band half-width actually used for gating, at least one pixel.
    pub fn band_px(&self) -> f64 {
        self.band_half_width.max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(FusionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_alpha() {
        let config = FusionConfig { ema_alpha: 0.0, ..FusionConfig::default() };
        assert!(matches!(config.validate(), Err(FusionError::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: FusionConfig = serde_json::from_str(r#"{"rdp_epsilon": 2.5}"#).unwrap();
        assert_eq!(config.rdp_epsilon, 2.5);
        assert_eq!(config.band_half_width, 3.0);
    }

    #[test]
    fn morph_radius_rounds_and_floors_at_one() {
        let mut config = FusionConfig::default();
        assert_eq!(config.morph_radius(), 3);
        config.band_half_width = 0.3;
        assert_eq!(config.morph_radius(), 1);
        config.band_half_width = 2.6;
        assert_eq!(config.morph_radius(), 3);
    }
}
