//! Streaming pose annotation: decode a video, run pose inference on every
//! frame, sample landmark checkpoints on a fixed playback-time grid, draw the
//! skeleton over the picture and re-encode it together with the original
//! audio track.

pub mod acquisition;
pub mod batch;
pub mod checkpoint;
pub mod overlay;
pub mod pipeline;
pub mod pose;
pub mod shared;
pub mod video;
