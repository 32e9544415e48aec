use std::cell::RefCell;

use ndarray::Zip;

use crate::overlay::domain::frame_compositor::FrameCompositor;
use crate::overlay::domain::overlay_style::OverlayStyle;
use crate::pose::domain::landmark::{PoseLandmarks, PoseResult, POSE_CONNECTIONS};
use crate::shared::constants::OVERLAY_ALPHA;
use crate::shared::frame::Frame;

use super::raster;

/// Draws the pose skeleton on a copy of the frame and blends the copy back
/// over the original: `out = alpha * overlay + (1 - alpha) * original`.
///
/// Only landmarks that are visible and inside the frame are drawn; an edge
/// needs both endpoints.
pub struct SkeletonCompositor {
    style: OverlayStyle,
    alpha: f64,
    overlay_buf: RefCell<Option<Frame>>,
}

impl SkeletonCompositor {
    pub fn new(style: OverlayStyle, alpha: f64) -> Self {
        Self {
            style,
            alpha: alpha.clamp(0.0, 1.0),
            overlay_buf: RefCell::new(None),
        }
    }

    fn draw_skeleton(&self, overlay: &mut Frame, pose: &PoseLandmarks) {
        let (w, h) = (overlay.width(), overlay.height());
        let pixels: Vec<Option<(i32, i32)>> = pose
            .points()
            .iter()
            .map(|p| if p.is_visible() { p.to_pixel(w, h) } else { None })
            .collect();

        for &(a, b) in POSE_CONNECTIONS.iter() {
            if let (Some(from), Some(to)) = (pixels[a], pixels[b]) {
                raster::draw_line(
                    overlay,
                    from,
                    to,
                    self.style.connection_thickness,
                    self.style.connection_color,
                );
            }
        }

        for &(x, y) in pixels.iter().flatten() {
            raster::fill_disk(
                overlay,
                x,
                y,
                self.style.landmark_radius as i32,
                self.style.landmark_color,
            );
        }
    }
}

impl Default for SkeletonCompositor {
    fn default() -> Self {
        Self::new(OverlayStyle::default(), OVERLAY_ALPHA)
    }
}

impl FrameCompositor for SkeletonCompositor {
    fn composite(
        &self,
        frame: &mut Frame,
        pose: &PoseResult,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(pose) = pose else {
            return Ok(());
        };

        let mut slot = self.overlay_buf.borrow_mut();
        let mut overlay = match slot.take() {
            Some(mut buf) if buf.width() == frame.width() && buf.height() == frame.height() => {
                buf.data_mut().copy_from_slice(frame.data());
                buf
            }
            _ => frame.clone(),
        };
        self.draw_skeleton(&mut overlay, pose);

        let alpha = self.alpha;
        Zip::from(frame.as_ndarray_mut())
            .and(&overlay.as_ndarray())
            .for_each(|out, &drawn| {
                let blended = alpha * drawn as f64 + (1.0 - alpha) * *out as f64;
                *out = blended.round().clamp(0.0, 255.0) as u8;
            });

        *slot = Some(overlay);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::domain::landmark::{LandmarkPoint, POSE_LANDMARK_COUNT};

    fn pose_with(points: &[(usize, f64, f64, f64)]) -> PoseResult {
        let mut all = vec![LandmarkPoint::new(0.5, 0.5, 0.0, 0.0); POSE_LANDMARK_COUNT];
        for &(i, x, y, visibility) in points {
            all[i] = LandmarkPoint::new(x, y, 0.0, visibility);
        }
        Some(PoseLandmarks::new(all).unwrap())
    }

    #[test]
    fn test_no_pose_leaves_frame_identical() {
        let compositor = SkeletonCompositor::default();
        let mut frame = Frame::filled(32, 24, [12, 34, 56], 7);
        let original = frame.clone();
        compositor.composite(&mut frame, &None).unwrap();
        assert_eq!(frame, original);
    }

    #[test]
    fn test_invisible_pose_leaves_frame_identical() {
        let compositor = SkeletonCompositor::default();
        let mut frame = Frame::filled(32, 24, [12, 34, 56], 0);
        let original = frame.clone();
        compositor
            .composite(&mut frame, &pose_with(&[]))
            .unwrap();
        assert_eq!(frame, original);
    }

    #[test]
    fn test_joint_blended_at_three_quarters() {
        let compositor = SkeletonCompositor::default();
        let mut frame = Frame::filled(40, 40, [0, 0, 100], 0);
        compositor
            .composite(&mut frame, &pose_with(&[(0, 0.5, 0.5, 1.0)]))
            .unwrap();

        // White joint: 0.75 * 255 + 0.25 * original.
        assert_eq!(frame.pixel(20, 20), Some([191, 191, 216]));
        // Untouched pixels keep their value through the blend.
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 100]));
    }

    #[test]
    fn test_connection_drawn_between_visible_endpoints() {
        let compositor = SkeletonCompositor::default();
        let mut frame = Frame::filled(100, 100, [0, 0, 0], 0);
        compositor
            .composite(
                &mut frame,
                &pose_with(&[(11, 0.2, 0.5, 0.9), (12, 0.8, 0.5, 0.9)]),
            )
            .unwrap();

        // Midpoint of the shoulder line is green at 75%.
        assert_eq!(frame.pixel(50, 50), Some([0, 191, 0]));
    }

    #[test]
    fn test_connection_skipped_when_endpoint_hidden() {
        let compositor = SkeletonCompositor::default();
        let mut frame = Frame::filled(100, 100, [0, 0, 0], 0);
        compositor
            .composite(
                &mut frame,
                &pose_with(&[(11, 0.2, 0.5, 0.9), (12, 0.8, 0.5, 0.2)]),
            )
            .unwrap();
        assert_eq!(frame.pixel(50, 50), Some([0, 0, 0]));
    }

    #[test]
    fn test_connection_skipped_when_endpoint_off_screen() {
        let compositor = SkeletonCompositor::default();
        let mut frame = Frame::filled(100, 100, [0, 0, 0], 0);
        compositor
            .composite(
                &mut frame,
                &pose_with(&[(11, 0.2, 0.5, 0.9), (12, 1.4, 0.5, 0.9)]),
            )
            .unwrap();
        assert_eq!(frame.pixel(60, 50), Some([0, 0, 0]));
        // The on-screen joint is still drawn.
        assert_eq!(frame.pixel(20, 50), Some([191, 191, 191]));
    }

    #[test]
    fn test_buffer_reused_across_frame_sizes() {
        let compositor = SkeletonCompositor::default();
        let pose = pose_with(&[(0, 0.5, 0.5, 1.0)]);
        let mut small = Frame::filled(10, 10, [0, 0, 0], 0);
        let mut large = Frame::filled(30, 20, [0, 0, 0], 1);
        compositor.composite(&mut small, &pose).unwrap();
        compositor.composite(&mut large, &pose).unwrap();
        compositor.composite(&mut small, &pose).unwrap();
        assert_eq!(large.pixel(15, 10), Some([191, 191, 191]));
    }

    #[test]
    fn test_alpha_one_copies_overlay() {
        let compositor = SkeletonCompositor::new(OverlayStyle::default(), 1.0);
        let mut frame = Frame::filled(40, 40, [10, 10, 10], 0);
        compositor
            .composite(&mut frame, &pose_with(&[(0, 0.5, 0.5, 1.0)]))
            .unwrap();
        assert_eq!(frame.pixel(20, 20), Some([255, 255, 255]));
    }
}
