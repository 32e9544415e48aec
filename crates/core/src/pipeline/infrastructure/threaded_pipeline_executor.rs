use std::time::Instant;

use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::pipeline_executor::{elapsed_ms, FrameStages, PipelineExecutor};
use crate::shared::frame::Frame;
use crate::video::domain::video_reader::VideoReader;

/// Single-slot hand-off between the reader thread and the main loop.
const DEFAULT_CHANNEL_CAPACITY: usize = 1;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Decodes on a dedicated thread so decoding overlaps inference.
///
/// Layout: `reader → [bounded slot] → main [infer/sample/composite/write]`
///
/// Everything after decoding stays on the calling thread, so frames reach
/// the writer in decode order. When the main loop stops early it drops the
/// receiving end, which makes the reader thread's next send fail and ends it.
pub struct ThreadedPipelineExecutor {
    channel_capacity: usize,
}

impl ThreadedPipelineExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_capacity(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }
}

impl Default for ThreadedPipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineExecutor for ThreadedPipelineExecutor {
    fn stream(
        &self,
        reader: &mut dyn VideoReader,
        stages: &mut FrameStages<'_>,
    ) -> Result<usize, PipelineError> {
        let (frame_tx, frame_rx) =
            crossbeam_channel::bounded::<Result<(Frame, f64), SendError>>(self.channel_capacity);

        std::thread::scope(|scope| {
            let reader_handle = scope.spawn(move || decode_frames(reader, frame_tx));

            let result = run_main_loop(frame_rx, stages);

            if reader_handle.join().is_err() && result.is_ok() {
                return Err(PipelineError::Decode {
                    frame: stages.frames_written,
                    reason: "reader thread panicked".to_string(),
                });
            }
            result
        })
    }
}

fn decode_frames(
    reader: &mut dyn VideoReader,
    frame_tx: crossbeam_channel::Sender<Result<(Frame, f64), SendError>>,
) {
    let mut frames = reader.frames();
    loop {
        let t = Instant::now();
        let Some(next) = frames.next() else {
            break;
        };
        let failed = next.is_err();
        let mapped = next
            .map(|frame| (frame, elapsed_ms(t)))
            .map_err(|e| -> SendError { e.to_string().into() });
        if frame_tx.send(mapped).is_err() || failed {
            break;
        }
    }
}

/// Receives decoded frames and drives them through the remaining stages.
/// Takes the receiver by value so that returning early disconnects it.
fn run_main_loop(
    frame_rx: crossbeam_channel::Receiver<Result<(Frame, f64), SendError>>,
    stages: &mut FrameStages<'_>,
) -> Result<usize, PipelineError> {
    let mut frame_number = 0;

    for decoded in frame_rx {
        let (frame, decode_ms) = decoded.map_err(|e| PipelineError::Decode {
            frame: frame_number,
            reason: e.to_string(),
        })?;
        stages.logger.timing("decode", decode_ms);

        frame_number += 1;
        stages.process(frame, frame_number)?;
    }

    Ok(stages.frames_written)
}
