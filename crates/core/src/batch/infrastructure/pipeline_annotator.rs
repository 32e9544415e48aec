use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::batch::domain::video_annotator::VideoAnnotator;
use crate::checkpoint::infrastructure::json_checkpoint_store::JsonCheckpointStore;
use crate::overlay::domain::overlay_style::OverlayStyle;
use crate::overlay::infrastructure::skeleton_compositor::SkeletonCompositor;
use crate::pipeline::annotate_video_use_case::{AnnotateVideoUseCase, AnnotationReport};
use crate::pipeline::infrastructure::sequential_pipeline_executor::SequentialPipelineExecutor;
use crate::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::pipeline_executor::PipelineExecutor;
use crate::pipeline::pipeline_logger::LogPipelineLogger;
use crate::pose::domain::pose_estimator::PoseEstimatorConfig;
use crate::pose::infrastructure::onnx_pose_estimator::OnnxPoseEstimator;
use crate::shared::model_resolver::{self, ModelSource};
use crate::shared::constants::{DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_PROGRESS_EVERY, OVERLAY_ALPHA};
use crate::shared::video_metadata::OpenError;
use crate::video::infrastructure::ffmpeg_process_writer::{EncoderSettings, FfmpegProcessWriter};
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

/// Everything needed to build a pipeline, fixed for a whole batch.
#[derive(Clone, Debug)]
pub struct AnnotatorSettings {
    pub model_path: PathBuf,
    pub estimator: PoseEstimatorConfig,
    pub encoder: EncoderSettings,
    pub overlay: OverlayStyle,
    pub checkpoint_interval: f64,
    /// Decode on a worker thread instead of the calling thread.
    pub threaded: bool,
    pub progress_every: usize,
}

impl AnnotatorSettings {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            estimator: PoseEstimatorConfig::default(),
            encoder: EncoderSettings::default(),
            overlay: OverlayStyle::default(),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            threaded: false,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Builds the production pipeline (ffmpeg decode, ONNX pose model, skeleton
/// overlay, ffmpeg encode, JSON checkpoints) afresh for every video.
pub struct PipelineAnnotator {
    settings: AnnotatorSettings,
}

impl PipelineAnnotator {
    pub fn new(settings: AnnotatorSettings) -> Self {
        Self { settings }
    }

    fn executor(&self) -> Box<dyn PipelineExecutor> {
        if self.settings.threaded {
            Box::new(ThreadedPipelineExecutor::new())
        } else {
            Box::new(SequentialPipelineExecutor::new())
        }
    }
}

impl VideoAnnotator for PipelineAnnotator {
    fn annotate(
        &self,
        input: &Path,
        output_video: &Path,
        pose_artifact: &Path,
    ) -> Result<AnnotationReport, PipelineError> {
        let settings = &self.settings;
        let estimator = OnnxPoseEstimator::new(&settings.model_path, settings.estimator.clone())
            .map_err(|e| OpenError::Estimator(e.to_string()))?;

        let mut use_case = AnnotateVideoUseCase::new(
            Box::new(FfmpegReader::new()),
            Box::new(FfmpegProcessWriter::new(settings.encoder.clone())),
            Box::new(estimator),
            Box::new(SkeletonCompositor::new(settings.overlay.clone(), OVERLAY_ALPHA)),
            Box::new(JsonCheckpointStore::new(pose_artifact)),
            self.executor(),
            Box::new(LogPipelineLogger::new(settings.progress_every)),
            settings.checkpoint_interval,
        );
        use_case.execute(input, output_video)
    }
}

/// Resolves the model file on first use, so a run where every video is
/// already processed never needs the model (or a download).
pub struct ModelResolvingAnnotator {
    model_name: String,
    source: ModelSource,
    settings: AnnotatorSettings,
    progress: Option<fn(u64, u64)>,
    resolved: Mutex<Option<PipelineAnnotator>>,
}

impl ModelResolvingAnnotator {
    /// `settings.model_path` is replaced by the resolved path.
    pub fn new(
        model_name: impl Into<String>,
        source: ModelSource,
        settings: AnnotatorSettings,
        progress: Option<fn(u64, u64)>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            source,
            settings,
            progress,
            resolved: Mutex::new(None),
        }
    }

    fn resolve(&self) -> Result<PipelineAnnotator, OpenError> {
        log::info!("Resolving model: {}", self.model_name);
        let progress = self
            .progress
            .map(|f| -> model_resolver::ProgressFn { Box::new(f) });
        let model_path = model_resolver::resolve(&self.model_name, &self.source, progress)
            .map_err(|e| OpenError::Estimator(e.to_string()))?;
        let mut settings = self.settings.clone();
        settings.model_path = model_path;
        Ok(PipelineAnnotator::new(settings))
    }
}

impl VideoAnnotator for ModelResolvingAnnotator {
    fn annotate(
        &self,
        input: &Path,
        output_video: &Path,
        pose_artifact: &Path,
    ) -> Result<AnnotationReport, PipelineError> {
        let mut slot = self
            .resolved
            .lock()
            .map_err(|_| OpenError::Estimator("model resolution lock poisoned".to_string()))?;
        let annotator = match slot.take() {
            Some(annotator) => annotator,
            None => self.resolve()?,
        };
        let result = annotator.annotate(input, output_video, pose_artifact);
        *slot = Some(annotator);
        result
    }
}
