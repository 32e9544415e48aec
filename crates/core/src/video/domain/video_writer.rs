use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Sink for composited frames. The audio track is taken from
/// `metadata.source_path` and muxed in unmodified.
pub trait VideoWriter: Send {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// May block while the consumer catches up. An error means no further
    /// frames can be accepted.
    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Finishes the output and surfaces the encoder's exit status.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
