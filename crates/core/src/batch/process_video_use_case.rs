use std::fs;
use std::path::Path;

use crate::acquisition::domain::media_fetcher::{FetchError, MediaFetcher};
use crate::acquisition::domain::video_locator::is_remote;
use crate::pipeline::annotate_video_use_case::AnnotationReport;
use crate::pipeline::pipeline_error::PipelineError;

use super::domain::output_layout::{remove_if_exists, OutputLayout};
use super::domain::video_annotator::VideoAnnotator;

/// How processing a single video ended.
#[derive(Debug)]
pub enum VideoOutcome {
    /// Both outputs already existed; nothing was done.
    Skipped,
    Completed(AnnotationReport),
    FetchFailed(FetchError),
    ProcessingFailed(PipelineError),
}

impl VideoOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            VideoOutcome::FetchFailed(_) | VideoOutcome::ProcessingFailed(_)
        )
    }
}

/// Fetch → annotate → clean up, for one video id.
///
/// Remote locators go through `remote_fetcher`, anything else is treated as
/// a local path. The temp copy of the source is removed on every path. When
/// annotation fails the partial output video is removed too, so the id is
/// not considered processed next time.
pub struct ProcessVideoUseCase {
    remote_fetcher: Box<dyn MediaFetcher>,
    local_fetcher: Box<dyn MediaFetcher>,
    annotator: Box<dyn VideoAnnotator>,
    layout: OutputLayout,
}

impl ProcessVideoUseCase {
    pub fn new(
        remote_fetcher: Box<dyn MediaFetcher>,
        local_fetcher: Box<dyn MediaFetcher>,
        annotator: Box<dyn VideoAnnotator>,
        layout: OutputLayout,
    ) -> Self {
        Self {
            remote_fetcher,
            local_fetcher,
            annotator,
            layout,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn execute(&self, locator: &str, video_id: &str) -> VideoOutcome {
        if self.layout.is_processed(video_id) {
            log::info!("{video_id}: already processed, skipping");
            return VideoOutcome::Skipped;
        }

        // A local source that already sits at the input path belongs to the
        // user and survives cleanup.
        let keep = (!is_remote(locator))
            .then(|| fs::canonicalize(locator).ok())
            .flatten();

        let outcome = self.fetch_and_annotate(locator, video_id);
        self.remove_temp_files(video_id, keep.as_deref());

        match &outcome {
            VideoOutcome::Completed(report) => log::info!(
                "{video_id}: done ({} frames, {} checkpoints)",
                report.frames_written,
                report.checkpoints.len()
            ),
            VideoOutcome::FetchFailed(e) => log::error!("{video_id}: download failed: {e}"),
            VideoOutcome::ProcessingFailed(e) => {
                log::error!("{video_id}: processing failed: {e}")
            }
            VideoOutcome::Skipped => {}
        }
        outcome
    }

    fn fetch_and_annotate(&self, locator: &str, video_id: &str) -> VideoOutcome {
        if let Err(source) = self.layout.ensure_dirs() {
            return VideoOutcome::FetchFailed(FetchError::Prepare {
                dir: self.layout.output_dir.clone(),
                source,
            });
        }

        let input = self.layout.input_path(video_id);
        let fetcher = if is_remote(locator) {
            &self.remote_fetcher
        } else {
            &self.local_fetcher
        };
        if let Err(e) = fetcher.fetch(locator, &input) {
            return VideoOutcome::FetchFailed(e);
        }

        let output_video = self.layout.output_video_path(video_id);
        let artifact = self.layout.pose_artifact_path(video_id);
        log::info!("{video_id}: annotating");
        match self.annotator.annotate(&input, &output_video, &artifact) {
            Ok(report) => VideoOutcome::Completed(report),
            Err(e) => {
                remove_if_exists(&output_video);
                VideoOutcome::ProcessingFailed(e)
            }
        }
    }

    fn remove_temp_files(&self, video_id: &str, keep: Option<&Path>) {
        for path in self.layout.temp_files(video_id) {
            if keep.is_some() && fs::canonicalize(&path).ok().as_deref() == keep {
                continue;
            }
            remove_if_exists(&path);
        }
    }
}
