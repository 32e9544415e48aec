/// Landmark model files, one per complexity tier.
pub const POSE_MODEL_LITE: &str = "pose_landmark_lite.onnx";
pub const POSE_MODEL_FULL: &str = "pose_landmark_full.onnx";
pub const POSE_MODEL_HEAVY: &str = "pose_landmark_heavy.onnx";

/// Seconds of playback between two checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: f64 = 0.5;

/// Smallest interval that still yields distinct one-decimal timestamps.
pub const MIN_CHECKPOINT_INTERVAL: f64 = 0.1;

pub const DEFAULT_MIN_DETECTION_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_MIN_TRACKING_CONFIDENCE: f64 = 0.5;

/// Weight of the drawn overlay when blending it back onto the frame.
pub const OVERLAY_ALPHA: f64 = 0.75;

/// Log a progress line every this many frames.
pub const DEFAULT_PROGRESS_EVERY: usize = 100;

pub const OUTPUT_VIDEO_EXTENSION: &str = "mp4";
pub const POSE_ARTIFACT_SUFFIX: &str = "_action_mesh.json";

pub const DEFAULT_OUTPUT_DIR: &str = "public/processed";
pub const DEFAULT_TEMP_DIR: &str = "temp";

pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";
pub const DEFAULT_YT_DLP_BINARY: &str = "yt-dlp";

/// Best mp4 video up to 720p plus m4a audio, falling back to a muxed stream.
pub const YT_DLP_FORMAT: &str =
    "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[height<=720][ext=mp4]/best[height<=720]";
