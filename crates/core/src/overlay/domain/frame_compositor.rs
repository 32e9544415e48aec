use crate::pose::domain::landmark::PoseResult;
use crate::shared::frame::Frame;

/// Domain interface for drawing a pose onto a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`). A frame without
/// a pose must come out byte-identical.
pub trait FrameCompositor: Send {
    fn composite(&self, frame: &mut Frame, pose: &PoseResult)
        -> Result<(), Box<dyn std::error::Error>>;
}
