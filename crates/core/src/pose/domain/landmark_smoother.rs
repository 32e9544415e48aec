use super::landmark::{LandmarkPoint, PoseLandmarks};

/// Default EMA weight of the newest observation.
pub const DEFAULT_ALPHA: f64 = 0.6;

/// EMA (Exponential Moving Average) smoother over landmark positions.
///
/// Formula: `ema[t] = alpha * current + (1 - alpha) * ema[t-1]` applied to
/// `x`, `y` and `z`. Visibility is taken from the newest observation as-is.
pub struct LandmarkSmoother {
    alpha: f64,
    previous: Option<Vec<LandmarkPoint>>,
}

impl LandmarkSmoother {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            previous: None,
        }
    }

    pub fn smooth(&mut self, pose: PoseLandmarks) -> PoseLandmarks {
        let alpha = self.alpha;
        let smoothed = match &self.previous {
            None => pose,
            Some(prev) => pose.map_points(|i, c| {
                let p = prev[i];
                LandmarkPoint {
                    x: alpha * c.x + (1.0 - alpha) * p.x,
                    y: alpha * c.y + (1.0 - alpha) * p.y,
                    z: alpha * c.z + (1.0 - alpha) * p.z,
                    visibility: c.visibility,
                }
            }),
        };

        self.previous = Some(smoothed.points().to_vec());
        smoothed
    }

    /// Forgets history, e.g. after tracking is lost.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

impl Default for LandmarkSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}
