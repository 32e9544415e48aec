use std::path::Path;

use crate::checkpoint::domain::checkpoint::Checkpoint;
use crate::checkpoint::domain::checkpoint_sampler::CheckpointSampler;
use crate::checkpoint::domain::checkpoint_store::CheckpointStore;
use crate::overlay::domain::frame_compositor::FrameCompositor;
use crate::pose::domain::pose_estimator::PoseEstimator;
use crate::shared::video_metadata::{OpenError, VideoMetadata};
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_error::PipelineError;
use super::pipeline_executor::{FrameStages, PipelineExecutor};
use super::pipeline_logger::PipelineLogger;
use super::pipeline_state::PipelineState;

/// What a completed run produced.
#[derive(Debug)]
pub struct AnnotationReport {
    pub frames_written: usize,
    pub checkpoints: Vec<Checkpoint>,
    pub metadata: VideoMetadata,
}

/// Orchestrates one pose-annotation run over a single video.
///
/// Wires domain components together and delegates the frame loop to a
/// `PipelineExecutor`. This is a single-use struct: `execute` consumes the
/// owned components, so calling it twice fails with `AlreadyExecuted`.
///
/// Once the source and encoder are open, every exit path closes the
/// encoder, persists the checkpoints collected so far and releases the
/// estimator and reader. Each of these steps runs even if an earlier one
/// fails. Open failures write nothing.
pub struct AnnotateVideoUseCase {
    reader: Option<Box<dyn VideoReader>>,
    writer: Option<Box<dyn VideoWriter>>,
    estimator: Option<Box<dyn PoseEstimator>>,
    compositor: Option<Box<dyn FrameCompositor>>,
    store: Option<Box<dyn CheckpointStore>>,
    executor: Box<dyn PipelineExecutor>,
    logger: Box<dyn PipelineLogger>,
    checkpoint_interval: f64,
    state: PipelineState,
}

impl AnnotateVideoUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        estimator: Box<dyn PoseEstimator>,
        compositor: Box<dyn FrameCompositor>,
        store: Box<dyn CheckpointStore>,
        executor: Box<dyn PipelineExecutor>,
        logger: Box<dyn PipelineLogger>,
        checkpoint_interval: f64,
    ) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            estimator: Some(estimator),
            compositor: Some(compositor),
            store: Some(store),
            executor,
            logger,
            checkpoint_interval,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<AnnotationReport, PipelineError> {
        if self.state != PipelineState::Idle {
            return Err(PipelineError::AlreadyExecuted);
        }
        let (
            Some(mut reader),
            Some(mut writer),
            Some(mut estimator),
            Some(compositor),
            Some(mut store),
        ) = (
            self.reader.take(),
            self.writer.take(),
            self.estimator.take(),
            self.compositor.take(),
            self.store.take(),
        )
        else {
            return Err(PipelineError::AlreadyExecuted);
        };

        let (metadata, mut sampler) =
            match self.open(&mut *reader, &mut *writer, input_path, output_path) {
                Ok(opened) => opened,
                Err(e) => {
                    self.transition(PipelineState::Failed);
                    estimator.close();
                    reader.close();
                    self.transition(PipelineState::Closed);
                    return Err(e.into());
                }
            };
        self.transition(PipelineState::Opened);
        self.logger.info(&format!(
            "Annotating {} -> {} ({}x{} @ {:.2} fps)",
            input_path.display(),
            output_path.display(),
            metadata.width,
            metadata.height,
            metadata.fps
        ));

        self.transition(PipelineState::Streaming);
        let (stream_result, frames_written, checkpoints) = {
            let mut stages = FrameStages::new(
                &mut *estimator,
                &*compositor,
                &mut sampler,
                &mut *writer,
                &mut *self.logger,
                metadata.total_frames,
            );
            let result = self.executor.stream(&mut *reader, &mut stages);
            (result, stages.frames_written, stages.checkpoints)
        };

        if stream_result.is_err() {
            self.transition(PipelineState::Failed);
        }
        self.transition(PipelineState::Finalizing);

        let close_result = writer
            .close()
            .map_err(|e| PipelineError::EncodeClose(e.to_string()));
        let persist_result = store
            .persist(&checkpoints)
            .map_err(|e| PipelineError::Persist(e.to_string()));
        estimator.close();
        reader.close();

        self.transition(PipelineState::Closed);
        self.logger.summary();

        stream_result?;
        close_result?;
        persist_result?;

        self.logger.info(&format!(
            "Wrote {frames_written} frames and {} checkpoints",
            checkpoints.len()
        ));
        Ok(AnnotationReport {
            frames_written,
            checkpoints,
            metadata,
        })
    }

    /// Idle → Opened: inspect and validate the source, then start the encoder.
    fn open(
        &self,
        reader: &mut dyn VideoReader,
        writer: &mut dyn VideoWriter,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<(VideoMetadata, CheckpointSampler), OpenError> {
        let metadata = reader
            .open(input_path)
            .map_err(|e| OpenError::Unreadable {
                path: input_path.to_path_buf(),
                reason: e.to_string(),
            })?;
        metadata.validate()?;

        let sampler = CheckpointSampler::new(self.checkpoint_interval, metadata.fps)
            .map_err(OpenError::Schedule)?;

        writer
            .open(output_path, &metadata)
            .map_err(|e| OpenError::Encoder(e.to_string()))?;

        Ok((metadata, sampler))
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal pipeline transition {} -> {next}",
            self.state
        );
        self.logger.transition(self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::infrastructure::sequential_pipeline_executor::SequentialPipelineExecutor;
    use crate::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
    use crate::pipeline::test_support::*;
    use crate::shared::frame::Frame;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use PipelineState::*;

    struct Recorded {
        written: Arc<Mutex<Vec<Frame>>>,
        persisted: Arc<Mutex<Vec<Vec<Checkpoint>>>>,
        transitions: Arc<Mutex<Vec<(PipelineState, PipelineState)>>>,
        writer_opened: Arc<AtomicBool>,
        writer_closed: Arc<AtomicBool>,
        reader_closed: Arc<AtomicBool>,
        estimator_closed: Arc<AtomicBool>,
    }

    impl Recorded {
        fn persisted_once(&self) -> Vec<Checkpoint> {
            let persisted = self.persisted.lock().unwrap();
            assert_eq!(persisted.len(), 1, "checkpoints must be persisted exactly once");
            persisted[0].clone()
        }

        fn assert_all_released(&self) {
            assert!(self.writer_closed.load(Ordering::SeqCst));
            assert!(self.reader_closed.load(Ordering::SeqCst));
            assert!(self.estimator_closed.load(Ordering::SeqCst));
        }

        fn transitions(&self) -> Vec<(PipelineState, PipelineState)> {
            self.transitions.lock().unwrap().clone()
        }
    }

    fn build(
        reader: StubReader,
        writer: StubWriter,
        estimator: StubEstimator,
        store: StubStore,
        executor: Box<dyn PipelineExecutor>,
        interval: f64,
    ) -> (AnnotateVideoUseCase, Recorded) {
        let logger = RecordingLogger::default();
        let recorded = Recorded {
            written: writer.written.clone(),
            persisted: store.persisted.clone(),
            transitions: logger.transitions.clone(),
            writer_opened: writer.opened.clone(),
            writer_closed: writer.closed.clone(),
            reader_closed: reader.closed.clone(),
            estimator_closed: estimator.closed.clone(),
        };
        let use_case = AnnotateVideoUseCase::new(
            Box::new(reader),
            Box::new(writer),
            Box::new(estimator),
            Box::new(StubCompositor { fail_at: None }),
            Box::new(store),
            executor,
            Box::new(logger),
            interval,
        );
        (use_case, recorded)
    }

    fn build_default(
        reader: StubReader,
        writer: StubWriter,
        estimator: StubEstimator,
        store: StubStore,
    ) -> (AnnotateVideoUseCase, Recorded) {
        build(
            reader,
            writer,
            estimator,
            store,
            Box::new(SequentialPipelineExecutor::new()),
            0.5,
        )
    }

    fn execute(use_case: &mut AnnotateVideoUseCase) -> Result<AnnotationReport, PipelineError> {
        use_case.execute(Path::new("in.mp4"), Path::new("out.mp4"))
    }

    #[test]
    fn test_full_run_writes_every_frame_and_persists_log() {
        let (mut use_case, recorded) = build_default(
            StubReader::new(300, 30.0),
            StubWriter::new(),
            StubEstimator::always(),
            StubStore::new(),
        );

        let report = execute(&mut use_case).unwrap();

        assert_eq!(report.frames_written, 300);
        assert_eq!(report.checkpoints.len(), 20);
        assert_relative_eq!(report.checkpoints[19].time, 10.0);
        assert_eq!(recorded.written.lock().unwrap().len(), 300);
        assert_eq!(recorded.persisted_once(), report.checkpoints);
        recorded.assert_all_released();
        assert_eq!(use_case.state(), Closed);
        assert_eq!(
            recorded.transitions(),
            vec![
                (Idle, Opened),
                (Opened, Streaming),
                (Streaming, Finalizing),
                (Finalizing, Closed)
            ]
        );
    }

    #[test]
    fn test_one_frame_short_of_ten_seconds_drops_last_checkpoint() {
        let (mut use_case, _recorded) = build_default(
            StubReader::new(299, 30.0),
            StubWriter::new(),
            StubEstimator::always(),
            StubStore::new(),
        );
        assert_eq!(execute(&mut use_case).unwrap().checkpoints.len(), 19);
    }

    #[test]
    fn test_write_failure_midway_persists_partial_log() {
        let mut writer = StubWriter::new();
        writer.fail_write_at = Some(150);
        let (mut use_case, recorded) = build_default(
            StubReader::new(300, 30.0),
            writer,
            StubEstimator::always(),
            StubStore::new(),
        );

        let err = execute(&mut use_case).unwrap_err();

        assert!(matches!(err, PipelineError::EncodeWrite { frame: 150, .. }));
        assert_eq!(recorded.written.lock().unwrap().len(), 149);
        let persisted = recorded.persisted_once();
        assert_eq!(persisted.len(), 10);
        assert_relative_eq!(persisted[9].time, 5.0);
        recorded.assert_all_released();
        assert_eq!(
            recorded.transitions(),
            vec![
                (Idle, Opened),
                (Opened, Streaming),
                (Streaming, Failed),
                (Failed, Finalizing),
                (Finalizing, Closed)
            ]
        );
    }

    #[test]
    fn test_zero_fps_aborts_before_anything_is_written() {
        let mut reader = StubReader::new(300, 30.0);
        reader.metadata.fps = 0.0;
        let (mut use_case, recorded) = build_default(
            reader,
            StubWriter::new(),
            StubEstimator::always(),
            StubStore::new(),
        );

        let err = execute(&mut use_case).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Open(OpenError::InvalidFrameRate(_))
        ));
        assert!(!recorded.writer_opened.load(Ordering::SeqCst));
        assert!(recorded.written.lock().unwrap().is_empty());
        assert!(recorded.persisted.lock().unwrap().is_empty());
        assert!(recorded.reader_closed.load(Ordering::SeqCst));
        assert_eq!(recorded.transitions(), vec![(Idle, Failed), (Failed, Closed)]);
    }

    #[test]
    fn test_zero_dimensions_abort() {
        let mut reader = StubReader::new(10, 30.0);
        reader.metadata.height = 0;
        let (mut use_case, recorded) = build_default(
            reader,
            StubWriter::new(),
            StubEstimator::always(),
            StubStore::new(),
        );

        let err = execute(&mut use_case).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Open(OpenError::InvalidDimensions { height: 0, .. })
        ));
        assert!(recorded.persisted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_source_aborts() {
        let mut reader = StubReader::new(10, 30.0);
        reader.fail_open = true;
        let (mut use_case, recorded) = build_default(
            reader,
            StubWriter::new(),
            StubEstimator::always(),
            StubStore::new(),
        );

        let err = execute(&mut use_case).unwrap_err();
        assert!(matches!(err, PipelineError::Open(OpenError::Unreadable { .. })));
        assert!(err.to_string().contains("in.mp4"));
        assert!(!recorded.writer_opened.load(Ordering::SeqCst));
    }

    #[test]
    fn test_encoder_start_failure_writes_no_artifact() {
        let mut writer = StubWriter::new();
        writer.fail_open = true;
        let (mut use_case, recorded) = build_default(
            StubReader::new(10, 30.0),
            writer,
            StubEstimator::always(),
            StubStore::new(),
        );

        let err = execute(&mut use_case).unwrap_err();
        assert!(matches!(err, PipelineError::Open(OpenError::Encoder(_))));
        assert!(recorded.persisted.lock().unwrap().is_empty());
        assert!(recorded.estimator_closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_invalid_interval_rejected_at_open() {
        let (mut use_case, recorded) = build(
            StubReader::new(10, 30.0),
            StubWriter::new(),
            StubEstimator::always(),
            StubStore::new(),
            Box::new(SequentialPipelineExecutor::new()),
            0.0,
        );

        let err = execute(&mut use_case).unwrap_err();
        assert!(matches!(err, PipelineError::Open(OpenError::Schedule(_))));
        assert!(!recorded.writer_opened.load(Ordering::SeqCst));
    }

    #[test]
    fn test_inference_failure_persists_and_releases() {
        let mut estimator = StubEstimator::always();
        estimator.fail_at = Some(40);
        let (mut use_case, recorded) = build_default(
            StubReader::new(300, 30.0),
            StubWriter::new(),
            estimator,
            StubStore::new(),
        );

        let err = execute(&mut use_case).unwrap_err();

        assert!(matches!(err, PipelineError::Inference { frame: 41, .. }));
        assert_eq!(recorded.written.lock().unwrap().len(), 40);
        assert_eq!(recorded.persisted_once().len(), 2);
        recorded.assert_all_released();
    }

    #[test]
    fn test_encoder_close_failure_still_persists() {
        let mut writer = StubWriter::new();
        writer.fail_close = true;
        let (mut use_case, recorded) = build_default(
            StubReader::new(60, 30.0),
            writer,
            StubEstimator::always(),
            StubStore::new(),
        );

        let err = execute(&mut use_case).unwrap_err();

        assert!(matches!(err, PipelineError::EncodeClose(_)));
        assert_eq!(recorded.persisted_once().len(), 4);
        recorded.assert_all_released();
    }

    #[test]
    fn test_persist_failure_reported_after_clean_stream() {
        let mut store = StubStore::new();
        store.fail = true;
        let (mut use_case, recorded) = build_default(
            StubReader::new(30, 30.0),
            StubWriter::new(),
            StubEstimator::always(),
            store,
        );

        let err = execute(&mut use_case).unwrap_err();
        assert!(matches!(err, PipelineError::Persist(_)));
        recorded.assert_all_released();
    }

    #[test]
    fn test_stream_error_takes_precedence_over_close_error() {
        let mut writer = StubWriter::new();
        writer.fail_write_at = Some(3);
        writer.fail_close = true;
        let (mut use_case, _recorded) = build_default(
            StubReader::new(30, 30.0),
            writer,
            StubEstimator::always(),
            StubStore::new(),
        );

        let err = execute(&mut use_case).unwrap_err();
        assert!(matches!(err, PipelineError::EncodeWrite { frame: 3, .. }));
    }

    #[test]
    fn test_no_pose_anywhere_yields_empty_log_and_untouched_frames() {
        let (mut use_case, recorded) = build_default(
            StubReader::new(90, 30.0),
            StubWriter::new(),
            StubEstimator::with(|_| false),
            StubStore::new(),
        );

        let report = execute(&mut use_case).unwrap();

        assert!(report.checkpoints.is_empty());
        assert!(recorded.persisted_once().is_empty());
        for (i, frame) in recorded.written.lock().unwrap().iter().enumerate() {
            assert_eq!(*frame, Frame::filled(WIDTH, HEIGHT, [(i % 256) as u8, 0, 0], i));
        }
    }

    #[test]
    fn test_second_execute_fails() {
        let (mut use_case, recorded) = build_default(
            StubReader::new(5, 30.0),
            StubWriter::new(),
            StubEstimator::always(),
            StubStore::new(),
        );

        execute(&mut use_case).unwrap();
        let err = execute(&mut use_case).unwrap_err();

        assert!(matches!(err, PipelineError::AlreadyExecuted));
        assert_eq!(recorded.written.lock().unwrap().len(), 5);
        assert_eq!(recorded.persisted.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_threaded_executor_full_run() {
        let (mut use_case, recorded) = build(
            StubReader::new(300, 30.0),
            StubWriter::new(),
            StubEstimator::always(),
            StubStore::new(),
            Box::new(ThreadedPipelineExecutor::new()),
            0.5,
        );

        let report = execute(&mut use_case).unwrap();
        assert_eq!(report.frames_written, 300);
        assert_eq!(report.checkpoints.len(), 20);
        recorded.assert_all_released();
    }
}
