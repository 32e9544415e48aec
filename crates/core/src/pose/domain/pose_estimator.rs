use std::str::FromStr;

use crate::shared::constants::{
    DEFAULT_MIN_DETECTION_CONFIDENCE, DEFAULT_MIN_TRACKING_CONFIDENCE, POSE_MODEL_FULL,
    POSE_MODEL_HEAVY, POSE_MODEL_LITE,
};
use crate::shared::frame::Frame;

use super::landmark::PoseResult;

/// Domain interface for pose inference in video mode.
///
/// Implementations carry temporal state from one frame to the next (tracking,
/// smoothing), hence `&mut self`. One instance serves exactly one video.
pub trait PoseEstimator: Send {
    /// Returns `Ok(None)` when no body is detected. An `Err` means the
    /// inference engine itself failed.
    fn infer(&mut self, frame: &Frame) -> Result<PoseResult, Box<dyn std::error::Error>>;

    /// Releases the engine and drops all temporal state.
    fn close(&mut self) {}
}

/// Model size/accuracy trade-off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelComplexity {
    Lite,
    #[default]
    Full,
    Heavy,
}

impl ModelComplexity {
    pub fn model_name(self) -> &'static str {
        match self {
            ModelComplexity::Lite => POSE_MODEL_LITE,
            ModelComplexity::Full => POSE_MODEL_FULL,
            ModelComplexity::Heavy => POSE_MODEL_HEAVY,
        }
    }
}

impl FromStr for ModelComplexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lite" | "0" => Ok(ModelComplexity::Lite),
            "full" | "1" => Ok(ModelComplexity::Full),
            "heavy" | "2" => Ok(ModelComplexity::Heavy),
            other => Err(format!(
                "model complexity must be lite, full or heavy (0-2), got '{other}'"
            )),
        }
    }
}

/// Fixed per-run estimator parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseEstimatorConfig {
    pub complexity: ModelComplexity,
    pub smooth_landmarks: bool,
    /// Presence score needed to report a pose while nothing is tracked.
    pub min_detection_confidence: f64,
    /// Presence score needed to keep following an already tracked pose.
    pub min_tracking_confidence: f64,
}

impl Default for PoseEstimatorConfig {
    fn default() -> Self {
        Self {
            complexity: ModelComplexity::default(),
            smooth_landmarks: true,
            min_detection_confidence: DEFAULT_MIN_DETECTION_CONFIDENCE,
            min_tracking_confidence: DEFAULT_MIN_TRACKING_CONFIDENCE,
        }
    }
}

impl PoseEstimatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("min detection confidence", self.min_detection_confidence),
            ("min tracking confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be between 0.0 and 1.0, got {value}"));
            }
        }
        Ok(())
    }

    /// Presence threshold for the next frame.
    pub fn presence_threshold(&self, tracking: bool) -> f64 {
        if tracking {
            self.min_tracking_confidence
        } else {
            self.min_detection_confidence
        }
    }
}
