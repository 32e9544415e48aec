//! 33-point body landmark topology.
//!
//! Coordinates are normalized to the frame: `x` and `y` are in `[0, 1]` for
//! points inside the picture (they may fall slightly outside), `z` is depth
//! on roughly the same scale as `x`, with smaller values closer to the camera.

use serde::{Deserialize, Serialize};

/// Number of landmarks in every detected pose.
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Landmarks below this visibility are not drawn.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

/// Skeleton edges between landmark indices.
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    // face
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    // shoulders and arms
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    // torso
    (11, 23),
    (12, 24),
    (23, 24),
    // legs
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub visibility: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.visibility.is_finite()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility >= VISIBILITY_THRESHOLD
    }

    /// Pixel position, or `None` when the point lies outside the frame.
    pub fn to_pixel(&self, width: u32, height: u32) -> Option<(i32, i32)> {
        if !(0.0..=1.0).contains(&self.x) || !(0.0..=1.0).contains(&self.y) {
            return None;
        }
        let px = (self.x * width as f64).floor().min(width as f64 - 1.0);
        let py = (self.y * height as f64).floor().min(height as f64 - 1.0);
        Some((px as i32, py as i32))
    }
}

/// A full body pose: exactly [`POSE_LANDMARK_COUNT`] points.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseLandmarks {
    points: Vec<LandmarkPoint>,
}

impl PoseLandmarks {
    pub fn new(points: Vec<LandmarkPoint>) -> Result<Self, String> {
        if points.len() != POSE_LANDMARK_COUNT {
            return Err(format!(
                "a pose has {POSE_LANDMARK_COUNT} landmarks, got {}",
                points.len()
            ));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(format!("landmark {i} has a non-finite coordinate"));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }

    /// Applies `f` to every point; the landmark count is preserved.
    pub fn map_points(mut self, mut f: impl FnMut(usize, LandmarkPoint) -> LandmarkPoint) -> Self {
        for (i, point) in self.points.iter_mut().enumerate() {
            *point = f(i, *point);
        }
        self
    }
}

/// Outcome of pose inference on one frame; `None` means no body was found.
pub type PoseResult = Option<PoseLandmarks>;
