use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use pose_annotate_core::acquisition::domain::video_locator::{
    is_valid_video_id, video_id_from_locator,
};
use pose_annotate_core::acquisition::infrastructure::local_file_fetcher::LocalFileFetcher;
use pose_annotate_core::acquisition::infrastructure::yt_dlp_fetcher::YtDlpFetcher;
use pose_annotate_core::batch::domain::output_layout::OutputLayout;
use pose_annotate_core::batch::infrastructure::pipeline_annotator::{
    AnnotatorSettings, ModelResolvingAnnotator,
};
use pose_annotate_core::batch::process_playlist_use_case::ProcessPlaylistUseCase;
use pose_annotate_core::batch::process_video_use_case::{ProcessVideoUseCase, VideoOutcome};
use pose_annotate_core::pose::domain::pose_estimator::{ModelComplexity, PoseEstimatorConfig};
use pose_annotate_core::shared::constants::{
    DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_FFMPEG_BINARY, DEFAULT_MIN_DETECTION_CONFIDENCE,
    DEFAULT_MIN_TRACKING_CONFIDENCE, DEFAULT_OUTPUT_DIR, DEFAULT_PROGRESS_EVERY,
    DEFAULT_TEMP_DIR, DEFAULT_YT_DLP_BINARY, MIN_CHECKPOINT_INTERVAL,
};
use pose_annotate_core::shared::model_resolver::ModelSource;
use pose_annotate_core::video::infrastructure::ffmpeg_process_writer::EncoderSettings;

/// Annotate videos with a body-pose skeleton and sampled landmark checkpoints.
#[derive(Parser)]
#[command(name = "pose-annotate", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand)]
enum Command {
    /// Annotate a single video (URL or local file).
    Annotate {
        locator: String,
        /// Name for the outputs; derived from the locator when omitted.
        video_id: Option<String>,
    },
    /// Annotate every entry of a playlist JSON file, one after another.
    Batch { playlist: PathBuf },
}

#[derive(Args)]
struct Options {
    /// Directory receiving `<id>.mp4` and `<id>_action_mesh.json`.
    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Directory for downloaded sources; emptied after each video.
    #[arg(long, global = true, default_value = DEFAULT_TEMP_DIR)]
    temp_dir: PathBuf,

    /// Seconds of playback between two checkpoints.
    #[arg(long, global = true, default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
    interval: f64,

    /// Pose model tier: lite, full or heavy (or 0, 1, 2).
    #[arg(long, global = true, default_value = "full")]
    model_complexity: ModelComplexity,

    #[arg(long, global = true, default_value_t = DEFAULT_MIN_DETECTION_CONFIDENCE)]
    min_detection_confidence: f64,

    #[arg(long, global = true, default_value_t = DEFAULT_MIN_TRACKING_CONFIDENCE)]
    min_tracking_confidence: f64,

    /// Disable temporal smoothing of landmarks.
    #[arg(long, global = true)]
    no_smoothing: bool,

    /// Pose model file; skips the cache lookup and download.
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Download the model from this URL when it is not cached.
    #[arg(long, global = true)]
    model_url: Option<String>,

    #[arg(long, global = true, default_value = DEFAULT_FFMPEG_BINARY)]
    ffmpeg: PathBuf,

    #[arg(long, global = true, default_value = DEFAULT_YT_DLP_BINARY)]
    yt_dlp: PathBuf,

    /// x264 preset for the annotated output.
    #[arg(long, global = true, default_value = "ultrafast")]
    preset: String,

    /// H.264 CRF quality (0=lossless, 51=worst).
    #[arg(long, global = true)]
    crf: Option<u32>,

    /// Decode on a separate thread.
    #[arg(long, global = true)]
    threaded: bool,

    /// Log progress every N frames.
    #[arg(long, global = true, default_value_t = DEFAULT_PROGRESS_EVERY)]
    progress_every: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            log::error!("{e}");
            process::exit(2);
        }
    }
}

/// `Ok(false)` when at least one video failed.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli.options)?;

    let video = build_video_use_case(&cli.options);

    match cli.command {
        Command::Annotate { locator, video_id } => {
            let video_id = match video_id.or_else(|| video_id_from_locator(&locator)) {
                Some(id) if is_valid_video_id(&id) => id,
                Some(id) => {
                    return Err(format!(
                        "Video id '{id}' may only contain letters, digits, '_' and '-'"
                    )
                    .into())
                }
                None => {
                    return Err(format!(
                        "Cannot derive a video id from '{locator}'; pass one explicitly"
                    )
                    .into())
                }
            };
            let outcome = video.execute(&locator, &video_id);
            if let VideoOutcome::Completed(report) = &outcome {
                log::info!(
                    "Wrote {} and {}",
                    video.layout().output_video_path(&video_id).display(),
                    video.layout().pose_artifact_path(&video_id).display()
                );
                log::debug!("{:?}", report.metadata);
            }
            Ok(!outcome.is_failure())
        }
        Command::Batch { playlist } => {
            let summary = ProcessPlaylistUseCase::new(video).execute_file(&playlist)?;
            Ok(!summary.has_failures())
        }
    }
}

/// The model is resolved on the first video that actually needs annotating.
fn build_video_use_case(options: &Options) -> ProcessVideoUseCase {
    let complexity = options.model_complexity;
    let mut settings = AnnotatorSettings::new(PathBuf::new());
    settings.estimator = PoseEstimatorConfig {
        complexity,
        smooth_landmarks: !options.no_smoothing,
        min_detection_confidence: options.min_detection_confidence,
        min_tracking_confidence: options.min_tracking_confidence,
    };
    settings.encoder = EncoderSettings {
        binary: options.ffmpeg.clone(),
        preset: options.preset.clone(),
        crf: options.crf,
        ..EncoderSettings::default()
    };
    settings.checkpoint_interval = options.interval;
    settings.threaded = options.threaded;
    settings.progress_every = options.progress_every;

    let annotator = ModelResolvingAnnotator::new(
        complexity.model_name(),
        ModelSource {
            explicit_path: options.model.clone(),
            download_url: options.model_url.clone(),
            bundled_dir: Some(PathBuf::from("models")),
        },
        settings,
        Some(download_progress),
    );

    ProcessVideoUseCase::new(
        Box::new(YtDlpFetcher::new(options.yt_dlp.clone())),
        Box::new(LocalFileFetcher),
        Box::new(annotator),
        OutputLayout::new(options.output_dir.clone(), options.temp_dir.clone()),
    )
}

fn validate(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    if !options.interval.is_finite() || options.interval < MIN_CHECKPOINT_INTERVAL {
        return Err(format!(
            "Interval must be at least {MIN_CHECKPOINT_INTERVAL} seconds, got {}",
            options.interval
        )
        .into());
    }
    if !(0.0..=1.0).contains(&options.min_detection_confidence) {
        return Err(format!(
            "Detection confidence must be between 0.0 and 1.0, got {}",
            options.min_detection_confidence
        )
        .into());
    }
    if !(0.0..=1.0).contains(&options.min_tracking_confidence) {
        return Err(format!(
            "Tracking confidence must be between 0.0 and 1.0, got {}",
            options.min_tracking_confidence
        )
        .into());
    }
    if let Some(crf) = options.crf {
        if crf > 51 {
            return Err(format!("CRF must be between 0 and 51, got {crf}").into());
        }
    }
    if options.progress_every == 0 {
        return Err("Progress interval must be at least 1 frame".into());
    }
    if options.preset.trim().is_empty() {
        return Err("Preset must not be empty".into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading pose model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading pose model... {downloaded} bytes");
    }
}
