//! Stub pipeline components with failure injection, shared by the executor
//! and use-case tests.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::checkpoint::domain::checkpoint::Checkpoint;
use crate::checkpoint::domain::checkpoint_store::CheckpointStore;
use crate::overlay::domain::frame_compositor::FrameCompositor;
use crate::pose::domain::landmark::{LandmarkPoint, PoseLandmarks, PoseResult, POSE_LANDMARK_COUNT};
use crate::pose::domain::pose_estimator::PoseEstimator;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_logger::PipelineLogger;
use super::pipeline_state::PipelineState;

pub(crate) const WIDTH: u32 = 8;
pub(crate) const HEIGHT: u32 = 6;

pub(crate) fn metadata(fps: f64, total_frames: usize) -> VideoMetadata {
    VideoMetadata {
        width: WIDTH,
        height: HEIGHT,
        fps,
        total_frames,
        codec: "stub".to_string(),
        source_path: None,
    }
}

pub(crate) fn test_pose() -> PoseLandmarks {
    PoseLandmarks::new(vec![
        LandmarkPoint::new(0.5, 0.5, 0.0, 1.0);
        POSE_LANDMARK_COUNT
    ])
    .unwrap()
}

// --- Reader ---

pub(crate) struct StubReader {
    pub metadata: VideoMetadata,
    pub frames: usize,
    pub fail_open: bool,
    /// 0-based index of the frame whose decode fails.
    pub fail_decode_at: Option<usize>,
    pub pulled: Arc<AtomicUsize>,
    pub closed: Arc<AtomicBool>,
}

impl StubReader {
    pub fn new(frames: usize, fps: f64) -> Self {
        Self {
            metadata: metadata(fps, frames),
            frames,
            fail_open: false,
            fail_decode_at: None,
            pulled: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl VideoReader for StubReader {
    fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        if self.fail_open {
            return Err("stub reader cannot open".into());
        }
        Ok(self.metadata.clone())
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let pulled = self.pulled.clone();
        let fail_at = self.fail_decode_at;
        let (w, h) = (self.metadata.width, self.metadata.height);
        Box::new((0..self.frames).map(move |i| {
            pulled.fetch_add(1, Ordering::SeqCst);
            if fail_at == Some(i) {
                return Err("corrupt packet".into());
            }
            Ok(Frame::filled(w, h, [(i % 256) as u8, 0, 0], i))
        }))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// --- Writer ---

pub(crate) struct StubWriter {
    pub written: Arc<Mutex<Vec<Frame>>>,
    pub fail_open: bool,
    /// 1-based write call that fails.
    pub fail_write_at: Option<usize>,
    pub fail_close: bool,
    pub opened: Arc<AtomicBool>,
    pub closed: Arc<AtomicBool>,
}

impl StubWriter {
    pub fn new() -> Self {
        Self {
            written: Arc::new(Mutex::new(Vec::new())),
            fail_open: false,
            fail_write_at: None,
            fail_close: false,
            opened: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl VideoWriter for StubWriter {
    fn open(
        &mut self,
        _path: &Path,
        _metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail_open {
            return Err("ffmpeg not found".into());
        }
        self.opened.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let mut written = self.written.lock().unwrap();
        if self.fail_write_at == Some(written.len() + 1) {
            return Err("broken pipe".into());
        }
        written.push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close {
            return Err("encoder exited with status 1".into());
        }
        Ok(())
    }
}

// --- Estimator ---

pub(crate) struct StubEstimator {
    /// Decides from the 0-based frame index whether a pose is found.
    pub pose_at: fn(usize) -> bool,
    /// 0-based frame index whose inference fails.
    pub fail_at: Option<usize>,
    pub closed: Arc<AtomicBool>,
}

impl StubEstimator {
    pub fn always() -> Self {
        Self::with(|_| true)
    }

    pub fn with(pose_at: fn(usize) -> bool) -> Self {
        Self {
            pose_at,
            fail_at: None,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl PoseEstimator for StubEstimator {
    fn infer(&mut self, frame: &Frame) -> Result<PoseResult, Box<dyn std::error::Error>> {
        if self.fail_at == Some(frame.index()) {
            return Err("session run failed".into());
        }
        Ok((self.pose_at)(frame.index()).then(test_pose))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// --- Compositor ---

/// Marks frames with a pose by setting the green channel of pixel 0 to 255.
pub(crate) struct StubCompositor {
    pub fail_at: Option<usize>,
}

impl FrameCompositor for StubCompositor {
    fn composite(
        &self,
        frame: &mut Frame,
        pose: &PoseResult,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail_at == Some(frame.index()) {
            return Err("overlay failed".into());
        }
        if pose.is_some() {
            frame.data_mut()[1] = 255;
        }
        Ok(())
    }
}

// --- Store ---

pub(crate) struct StubStore {
    pub persisted: Arc<Mutex<Vec<Vec<Checkpoint>>>>,
    pub fail: bool,
}

impl StubStore {
    pub fn new() -> Self {
        Self {
            persisted: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }
}

impl CheckpointStore for StubStore {
    fn persist(&mut self, checkpoints: &[Checkpoint]) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail {
            return Err("disk full".into());
        }
        self.persisted.lock().unwrap().push(checkpoints.to_vec());
        Ok(())
    }
}

// --- Logger ---

#[derive(Default)]
pub(crate) struct RecordingLogger {
    pub transitions: Arc<Mutex<Vec<(PipelineState, PipelineState)>>>,
    pub progress: Arc<Mutex<Vec<usize>>>,
    pub stages: Arc<Mutex<Vec<String>>>,
}

impl PipelineLogger for RecordingLogger {
    fn progress(&mut self, current: usize, _total: usize) {
        self.progress.lock().unwrap().push(current);
    }

    fn timing(&mut self, stage: &str, _duration_ms: f64) {
        let mut stages = self.stages.lock().unwrap();
        if !stages.iter().any(|s| s == stage) {
            stages.push(stage.to_string());
        }
    }

    fn info(&mut self, _message: &str) {}

    fn transition(&mut self, from: PipelineState, to: PipelineState) {
        self.transitions.lock().unwrap().push((from, to));
    }
}
