use super::landmark::PoseLandmarks;

/// Expansion applied to the landmark bounding box when deriving the next ROI.
pub const ROI_SCALE: f64 = 1.25;

/// Smaller ROIs are treated as lost tracking.
const MIN_ROI_SIZE: f64 = 16.0;

/// Square region of interest in frame pixel coordinates.
///
/// The ROI may extend past the frame borders; samples outside the frame are
/// treated as padding by the estimator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseRoi {
    pub center_x: f64,
    pub center_y: f64,
    pub size: f64,
}

impl PoseRoi {
    /// Square covering the whole frame (letterbox).
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self {
            center_x: width as f64 / 2.0,
            center_y: height as f64 / 2.0,
            size: width.max(height) as f64,
        }
    }

    /// ROI for the next frame from the bounding box of the current pose.
    pub fn from_landmarks(pose: &PoseLandmarks, width: u32, height: u32) -> Option<Self> {
        let (w, h) = (width as f64, height as f64);
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in pose.points() {
            min_x = min_x.min(p.x * w);
            min_y = min_y.min(p.y * h);
            max_x = max_x.max(p.x * w);
            max_y = max_y.max(p.y * h);
        }

        let size = (max_x - min_x).max(max_y - min_y) * ROI_SCALE;
        if !size.is_finite() || size < MIN_ROI_SIZE {
            return None;
        }

        let roi = Self {
            center_x: (min_x + max_x) / 2.0,
            center_y: (min_y + max_y) / 2.0,
            size,
        };
        roi.overlaps_frame(w, h).then_some(roi)
    }

    pub fn origin(&self) -> (f64, f64) {
        (
            self.center_x - self.size / 2.0,
            self.center_y - self.size / 2.0,
        )
    }

    /// Maps ROI-relative `[0, 1]` coordinates to frame pixels.
    pub fn to_frame(&self, u: f64, v: f64) -> (f64, f64) {
        let (ox, oy) = self.origin();
        (ox + u * self.size, oy + v * self.size)
    }

    fn overlaps_frame(&self, w: f64, h: f64) -> bool {
        let (ox, oy) = self.origin();
        ox < w && oy < h && ox + self.size > 0.0 && oy + self.size > 0.0
    }
}
