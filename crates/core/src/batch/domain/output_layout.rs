use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::{
    DEFAULT_OUTPUT_DIR, DEFAULT_TEMP_DIR, OUTPUT_VIDEO_EXTENSION, POSE_ARTIFACT_SUFFIX,
};

/// Where the files of a video id live.
///
/// - `<temp_dir>/<id>.mp4`: downloaded source, removed after the run
/// - `<output_dir>/<id>.mp4`: annotated video
/// - `<output_dir>/<id>_action_mesh.json`: checkpoint log
#[derive(Clone, Debug, PartialEq)]
pub struct OutputLayout {
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
        }
    }
}

impl OutputLayout {
    pub fn new(output_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn input_path(&self, id: &str) -> PathBuf {
        self.temp_dir.join(format!("{id}.{OUTPUT_VIDEO_EXTENSION}"))
    }

    pub fn output_video_path(&self, id: &str) -> PathBuf {
        self.output_dir.join(format!("{id}.{OUTPUT_VIDEO_EXTENSION}"))
    }

    pub fn pose_artifact_path(&self, id: &str) -> PathBuf {
        self.output_dir.join(format!("{id}{POSE_ARTIFACT_SUFFIX}"))
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        fs::create_dir_all(&self.temp_dir)
    }

    /// Both the video and the checkpoint log exist.
    pub fn is_processed(&self, id: &str) -> bool {
        self.output_video_path(id).is_file() && self.pose_artifact_path(id).is_file()
    }

    /// Files in the temp dir belonging to `id`: the source itself plus any
    /// partial or per-format downloads (`<id>.mp4.part`, `<id>.f137.mp4`, ...).
    pub fn temp_files(&self, id: &str) -> Vec<PathBuf> {
        let prefix = format!("{id}.");
        let Ok(entries) = fs::read_dir(&self.temp_dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect()
    }
}

/// Removes a file if it exists, logging instead of failing.
pub fn remove_if_exists(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Could not remove {}: {e}", path.display()),
    }
}
