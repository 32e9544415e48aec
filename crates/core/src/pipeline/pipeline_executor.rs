use std::time::Instant;

use crate::checkpoint::domain::checkpoint::Checkpoint;
use crate::checkpoint::domain::checkpoint_sampler::CheckpointSampler;
use crate::overlay::domain::frame_compositor::FrameCompositor;
use crate::pose::domain::pose_estimator::PoseEstimator;
use crate::shared::frame::Frame;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_error::PipelineError;
use super::pipeline_logger::PipelineLogger;

/// Everything a decoded frame passes through after leaving the reader,
/// borrowed from the use case for the duration of the streaming phase.
pub struct FrameStages<'a> {
    pub estimator: &'a mut dyn PoseEstimator,
    pub compositor: &'a dyn FrameCompositor,
    pub sampler: &'a mut CheckpointSampler,
    pub writer: &'a mut dyn VideoWriter,
    pub logger: &'a mut dyn PipelineLogger,
    pub checkpoints: Vec<Checkpoint>,
    pub total_frames: usize,
    pub frames_written: usize,
}

impl<'a> FrameStages<'a> {
    pub fn new(
        estimator: &'a mut dyn PoseEstimator,
        compositor: &'a dyn FrameCompositor,
        sampler: &'a mut CheckpointSampler,
        writer: &'a mut dyn VideoWriter,
        logger: &'a mut dyn PipelineLogger,
        total_frames: usize,
    ) -> Self {
        Self {
            estimator,
            compositor,
            sampler,
            writer,
            logger,
            checkpoints: Vec::new(),
            total_frames,
            frames_written: 0,
        }
    }

    /// Infer, sample, composite and write one frame, in that order.
    ///
    /// `frame_number` counts decoded frames from 1.
    pub fn process(&mut self, mut frame: Frame, frame_number: usize) -> Result<(), PipelineError> {
        let t = Instant::now();
        let pose = self
            .estimator
            .infer(&frame)
            .map_err(|e| PipelineError::Inference {
                frame: frame_number,
                reason: e.to_string(),
            })?;
        self.logger.timing("infer", elapsed_ms(t));

        if let Some(checkpoint) = self.sampler.observe(frame_number, &pose) {
            self.checkpoints.push(checkpoint);
        }

        let t = Instant::now();
        self.compositor
            .composite(&mut frame, &pose)
            .map_err(|e| PipelineError::Composite {
                frame: frame_number,
                reason: e.to_string(),
            })?;
        self.logger.timing("composite", elapsed_ms(t));

        let t = Instant::now();
        self.writer
            .write(&frame)
            .map_err(|e| PipelineError::EncodeWrite {
                frame: frame_number,
                reason: e.to_string(),
            })?;
        self.logger.timing("write", elapsed_ms(t));

        self.frames_written += 1;
        self.logger.progress(frame_number, self.total_frames);
        Ok(())
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Abstracts how the decode → infer → composite → write loop is driven.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (single-threaded, decode on a worker thread).
/// Frames reach the writer strictly in decode order.
pub trait PipelineExecutor: Send {
    /// Streams every frame of an opened reader through `stages`. Returns the
    /// number of frames written, or the error that ended the stream.
    fn stream(
        &self,
        reader: &mut dyn VideoReader,
        stages: &mut FrameStages<'_>,
    ) -> Result<usize, PipelineError>;
}
