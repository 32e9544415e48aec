use thiserror::Error;

use crate::shared::video_metadata::OpenError;

/// Why an annotation run ended early.
///
/// Frame numbers count decoded frames from 1.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to open pipeline: {0}")]
    Open(#[from] OpenError),
    #[error("decode failed after frame {frame}: {reason}")]
    Decode { frame: usize, reason: String },
    #[error("pose inference failed at frame {frame}: {reason}")]
    Inference { frame: usize, reason: String },
    #[error("overlay failed at frame {frame}: {reason}")]
    Composite { frame: usize, reason: String },
    #[error("encoder rejected frame {frame}: {reason}")]
    EncodeWrite { frame: usize, reason: String },
    #[error("encoder did not finish cleanly: {0}")]
    EncodeClose(String),
    #[error("failed to persist checkpoints: {0}")]
    Persist(String),
    #[error("pipeline already executed")]
    AlreadyExecuted,
}
