use crate::pose::domain::landmark::PoseResult;
use crate::shared::constants::MIN_CHECKPOINT_INTERVAL;

use super::checkpoint::Checkpoint;

/// Slack when comparing the frame clock against the next due time, so that
/// e.g. frame 9 at 30 fps (0.3 s) still meets `3 × 0.1`.
const TIME_EPSILON: f64 = 1e-9;

/// Decides which frames produce a checkpoint.
///
/// Checkpoints are due at `interval, 2·interval, …`. A due checkpoint is
/// emitted on the first frame at or after its time that carries a pose and
/// is stamped with the nominal due time, not the frame time. While a due
/// checkpoint waits for a pose, no later one can be emitted: the schedule
/// never skips ahead, it only catches up one interval per emitted pose.
#[derive(Debug)]
pub struct CheckpointSampler {
    interval: f64,
    fps: f64,
    emitted: u64,
}

impl CheckpointSampler {
    pub fn new(interval: f64, fps: f64) -> Result<Self, String> {
        if !interval.is_finite() || interval < MIN_CHECKPOINT_INTERVAL {
            return Err(format!(
                "checkpoint interval must be at least {MIN_CHECKPOINT_INTERVAL}s, got {interval}"
            ));
        }
        if !fps.is_finite() || fps <= 0.0 {
            return Err(format!("frame rate must be positive, got {fps}"));
        }
        Ok(Self {
            interval,
            fps,
            emitted: 0,
        })
    }

    /// Time of the next checkpoint, in seconds.
    pub fn next_due(&self) -> f64 {
        (self.emitted + 1) as f64 * self.interval
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// `frame_number` counts decoded frames starting at 1, so the frame clock
    /// reads `frame_number / fps`.
    pub fn observe(&mut self, frame_number: usize, pose: &PoseResult) -> Option<Checkpoint> {
        let current_time = frame_number as f64 / self.fps;
        let due = self.next_due();
        if current_time + TIME_EPSILON < due {
            return None;
        }

        let landmarks = pose.as_ref()?;
        self.emitted += 1;
        Some(Checkpoint::new(due, landmarks))
    }
}
