use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems found while opening a source, before any frame is streamed.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("cannot open {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("invalid frame rate {0}")]
    InvalidFrameRate(f64),
    #[error("encoder could not start: {0}")]
    Encoder(String),
    #[error("pose estimator could not start: {0}")]
    Estimator(String),
    #[error("invalid checkpoint schedule: {0}")]
    Schedule(String),
}

/// Stream properties read when a source is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Container-reported frame count; 0 when unknown.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Rejects properties the encoder cannot work with.
    pub fn validate(&self) -> Result<(), OpenError> {
        if self.width == 0 || self.height == 0 {
            return Err(OpenError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(OpenError::InvalidFrameRate(self.fps));
        }
        Ok(())
    }

    /// Playback duration in seconds, when the frame count is known.
    pub fn duration_secs(&self) -> Option<f64> {
        if self.total_frames == 0 || self.fps <= 0.0 {
            None
        } else {
            Some(self.total_frames as f64 / self.fps)
        }
    }
}
