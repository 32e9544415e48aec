use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::checkpoint::domain::checkpoint::Checkpoint;
use crate::checkpoint::domain::checkpoint_store::CheckpointStore;

/// Writes the checkpoint log as a pretty-printed JSON array.
///
/// The document goes to a sibling `.tmp` file first and is renamed into
/// place, so readers never see a half-written artifact.
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(path: &Path) -> Result<Vec<Checkpoint>, Box<dyn std::error::Error>> {
        let file = fs::File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn persist(&mut self, checkpoints: &[Checkpoint]) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let result = (|| -> Result<(), Box<dyn std::error::Error>> {
            let mut writer = BufWriter::new(fs::File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, checkpoints)?;
            writer.flush()?;
            fs::rename(&tmp_path, &self.path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        } else {
            log::info!(
                "Saved {} pose checkpoints to {}",
                checkpoints.len(),
                self.path.display()
            );
        }
        result
    }
}
