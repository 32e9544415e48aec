use super::checkpoint::Checkpoint;

/// Domain interface for persisting the checkpoint log of one run.
///
/// Called exactly once per run, with checkpoints ordered by time.
pub trait CheckpointStore: Send {
    fn persist(&mut self, checkpoints: &[Checkpoint]) -> Result<(), Box<dyn std::error::Error>>;
}
