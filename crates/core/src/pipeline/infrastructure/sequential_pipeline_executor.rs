use std::time::Instant;

use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::pipeline_executor::{elapsed_ms, FrameStages, PipelineExecutor};
use crate::video::domain::video_reader::VideoReader;

/// Runs every stage on the calling thread, one frame at a time.
#[derive(Default)]
pub struct SequentialPipelineExecutor;

impl SequentialPipelineExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineExecutor for SequentialPipelineExecutor {
    fn stream(
        &self,
        reader: &mut dyn VideoReader,
        stages: &mut FrameStages<'_>,
    ) -> Result<usize, PipelineError> {
        let mut frames = reader.frames();
        let mut frame_number = 0;

        loop {
            let t = Instant::now();
            let Some(next) = frames.next() else {
                break;
            };
            let frame = next.map_err(|e| PipelineError::Decode {
                frame: frame_number,
                reason: e.to_string(),
            })?;
            stages.logger.timing("decode", elapsed_ms(t));

            frame_number += 1;
            stages.process(frame, frame_number)?;
        }

        Ok(stages.frames_written)
    }
}
