use std::path::Path;

use crate::pipeline::annotate_video_use_case::AnnotationReport;
use crate::pipeline::pipeline_error::PipelineError;

/// Runs one complete annotation pipeline. Every call gets fresh components,
/// so no state carries over between videos.
pub trait VideoAnnotator: Send {
    fn annotate(
        &self,
        input: &Path,
        output_video: &Path,
        pose_artifact: &Path,
    ) -> Result<AnnotationReport, PipelineError>;
}
