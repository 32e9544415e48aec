use serde::{Deserialize, Serialize};

use crate::pose::domain::landmark::{LandmarkPoint, PoseLandmarks};

/// Pose snapshot attached to a nominal point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Seconds from the start of the video, rounded to one decimal.
    pub time: f64,
    pub landmarks: Vec<LandmarkPoint>,
}

impl Checkpoint {
    pub fn new(time: f64, pose: &PoseLandmarks) -> Self {
        Self {
            time: round_to_tenth(time),
            landmarks: pose.points().to_vec(),
        }
    }
}

/// Rounds half away from zero to one decimal place.
pub fn round_to_tenth(seconds: f64) -> f64 {
    (seconds * 10.0).round() / 10.0
}
