//! Temporal smoothing of the per-frame binarization threshold.

/// First-order low-pass filter over a scalar threshold.
///
/// Seeded lazily by the first value it sees. One instance belongs to one
/// frame stream.
#[derive(Debug, Clone)]
pub struct ThresholdStabilizer {
    alpha: f64,
    state: Option<f64>,
}

impl ThresholdStabilizer {
    /// `alpha` in (0, 1]; 1 disables smoothing.
    pub fn new(alpha: f64) -> Self {
        Self { alpha, state: None }
    }

    /// Fold a raw threshold into the running average and return the new value.
    pub fn update(&mut self, raw: f64) -> f64 {
        let next = match self.state {
            None => raw,
            Some(prev) => (1.0 - self.alpha) * prev + self.alpha * raw,
        };
        self.state = Some(next);
        next
    }

    /// Current smoothed value, if any frame has been seen.
    pub fn value(&self) -> Option<f64> {
        self.state
    }

    /// Forget the running value; the next update re-seeds.
    pub fn reset(&mut self) {
        self.state = None;
    }
}
