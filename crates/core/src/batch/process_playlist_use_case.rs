use std::path::Path;

use crate::acquisition::domain::video_locator::video_id_from_locator;

use super::domain::playlist::{Playlist, PlaylistError};
use super::process_video_use_case::{ProcessVideoUseCase, VideoOutcome};

/// Per-outcome counts for one playlist run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Entries without a URL or without a derivable video id.
    pub invalid: usize,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Runs every playlist entry through [`ProcessVideoUseCase`], strictly one
/// after another. A failing entry is counted and logged; the run continues.
pub struct ProcessPlaylistUseCase {
    video: ProcessVideoUseCase,
}

impl ProcessPlaylistUseCase {
    pub fn new(video: ProcessVideoUseCase) -> Self {
        Self { video }
    }

    pub fn execute_file(&self, path: &Path) -> Result<BatchSummary, PlaylistError> {
        let playlist = Playlist::load(path)?;
        Ok(self.execute(&playlist))
    }

    pub fn execute(&self, playlist: &Playlist) -> BatchSummary {
        let total = playlist.videos.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };
        log::info!("Processing {total} videos");

        for (i, entry) in playlist.videos.iter().enumerate() {
            log::info!("[{}/{total}] {}", i + 1, entry.label());

            let Some(url) = entry.url.as_deref().filter(|u| !u.trim().is_empty()) else {
                log::warn!("[{}/{total}] no URL, skipping", i + 1);
                summary.invalid += 1;
                continue;
            };
            let Some(video_id) = video_id_from_locator(url) else {
                log::warn!("[{}/{total}] cannot derive a video id from {url}, skipping", i + 1);
                summary.invalid += 1;
                continue;
            };

            match self.video.execute(url, &video_id) {
                VideoOutcome::Skipped => summary.skipped += 1,
                VideoOutcome::Completed(_) => summary.completed += 1,
                VideoOutcome::FetchFailed(_) | VideoOutcome::ProcessingFailed(_) => {
                    summary.failed += 1
                }
            }
        }

        log::info!(
            "Batch finished: {} completed, {} skipped, {} failed, {} invalid",
            summary.completed,
            summary.skipped,
            summary.failed,
            summary.invalid
        );
        summary
    }
}
