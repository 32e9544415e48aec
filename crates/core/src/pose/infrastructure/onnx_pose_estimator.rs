/// Body pose estimator using a BlazePose-style landmark model on ONNX Runtime.
///
/// Video mode: the first frame (and any frame after tracking is lost) is
/// letterboxed whole into the model input; subsequent frames are cropped to
/// an ROI derived from the previous pose.
use std::path::Path;

use crate::pose::domain::landmark::{LandmarkPoint, PoseLandmarks, PoseResult, POSE_LANDMARK_COUNT};
use crate::pose::domain::landmark_smoother::LandmarkSmoother;
use crate::pose::domain::pose_estimator::{PoseEstimator, PoseEstimatorConfig};
use crate::pose::domain::pose_roi::PoseRoi;
use crate::shared::frame::Frame;

use super::execution_provider::{intra_op_threads, preferred_execution_providers};

/// Model input resolution (NHWC `[1, 256, 256, 3]`).
const INPUT_SIZE: usize = 256;

/// Values per landmark row: x, y, z, visibility logit, presence logit.
const VALUES_PER_LANDMARK: usize = 5;

pub struct OnnxPoseEstimator {
    session: Option<ort::session::Session>,
    config: PoseEstimatorConfig,
    smoother: LandmarkSmoother,
    tracked_roi: Option<PoseRoi>,
}

impl OnnxPoseEstimator {
    pub fn new(
        model_path: &Path,
        config: PoseEstimatorConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_op_threads())?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        log::debug!(
            "Loaded pose model {} ({:?})",
            model_path.display(),
            config.complexity
        );

        Ok(Self {
            session: Some(session),
            config,
            smoother: LandmarkSmoother::default(),
            tracked_roi: None,
        })
    }

    pub fn is_tracking(&self) -> bool {
        self.tracked_roi.is_some()
    }

    fn lose_track(&mut self) {
        self.tracked_roi = None;
        self.smoother.reset();
    }
}

impl PoseEstimator for OnnxPoseEstimator {
    fn infer(&mut self, frame: &Frame) -> Result<PoseResult, Box<dyn std::error::Error>> {
        let (fw, fh) = (frame.width(), frame.height());
        let tracking = self.tracked_roi.is_some();
        let roi = self
            .tracked_roi
            .unwrap_or_else(|| PoseRoi::full_frame(fw, fh));

        let session = self
            .session
            .as_mut()
            .ok_or("OnnxPoseEstimator: closed")?;

        let input_value = ort::value::Tensor::from_array(crop_to_tensor(frame, &roi))?;
        let (raw, presence) = {
            let outputs = session.run(ort::inputs![input_value])?;
            if outputs.len() < 2 {
                return Err(format!(
                    "Pose model produced {} outputs, expected landmarks and pose flag",
                    outputs.len()
                )
                .into());
            }
            let landmarks = outputs[0].try_extract_array::<f32>()?;
            let flag = outputs[1].try_extract_array::<f32>()?;
            let raw = landmarks
                .as_slice()
                .ok_or("Cannot get landmark tensor slice")?
                .to_vec();
            let presence = flag.iter().next().copied().ok_or("Empty pose flag tensor")?;
            (raw, presence)
        };

        if !pose_present(presence, self.config.presence_threshold(tracking)) {
            if tracking {
                log::debug!("Pose lost at frame {} (presence {presence:.2})", frame.index());
            }
            self.lose_track();
            return Ok(None);
        }

        let Some(mut pose) = decode_landmarks(&raw, &roi, fw, fh)? else {
            log::debug!("Discarding pose with non-finite landmarks at frame {}", frame.index());
            self.lose_track();
            return Ok(None);
        };
        if self.config.smooth_landmarks {
            pose = self.smoother.smooth(pose);
        }

        self.tracked_roi = PoseRoi::from_landmarks(&pose, fw, fh);
        if self.tracked_roi.is_none() {
            self.smoother.reset();
        }
        Ok(Some(pose))
    }

    fn close(&mut self) {
        self.session = None;
        self.lose_track();
    }
}

/// The pose flag is already a probability; a non-finite flag counts as absent.
fn pose_present(flag: f32, threshold: f64) -> bool {
    flag.is_finite() && flag as f64 >= threshold
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Samples the ROI into a normalized NHWC float tensor (nearest neighbour).
/// Samples falling outside the frame stay zero.
fn crop_to_tensor(frame: &Frame, roi: &PoseRoi) -> ndarray::Array4<f32> {
    let mut tensor = ndarray::Array4::<f32>::zeros((1, INPUT_SIZE, INPUT_SIZE, 3));
    let src = frame.as_ndarray();
    let (fw, fh) = (frame.width() as f64, frame.height() as f64);
    let step = 1.0 / INPUT_SIZE as f64;

    for ty in 0..INPUT_SIZE {
        for tx in 0..INPUT_SIZE {
            let (fx, fy) = roi.to_frame((tx as f64 + 0.5) * step, (ty as f64 + 0.5) * step);
            if fx < 0.0 || fy < 0.0 || fx >= fw || fy >= fh {
                continue;
            }
            let (sx, sy) = (fx as usize, fy as usize);
            for c in 0..3 {
                tensor[[0, ty, tx, c]] = src[[sy, sx, c]] as f32 / 255.0;
            }
        }
    }
    tensor
}

/// Converts raw model rows (input-pixel coordinates) to frame-normalized
/// landmarks. Auxiliary rows past the 33 body points are ignored. A row with
/// a non-finite value yields `None`.
fn decode_landmarks(
    raw: &[f32],
    roi: &PoseRoi,
    frame_width: u32,
    frame_height: u32,
) -> Result<PoseResult, Box<dyn std::error::Error>> {
    if raw.len() < POSE_LANDMARK_COUNT * VALUES_PER_LANDMARK {
        return Err(format!(
            "Landmark tensor has {} values, need at least {}",
            raw.len(),
            POSE_LANDMARK_COUNT * VALUES_PER_LANDMARK
        )
        .into());
    }

    let input = INPUT_SIZE as f64;
    let (fw, fh) = (frame_width as f64, frame_height as f64);
    let points: Vec<LandmarkPoint> = raw
        .chunks_exact(VALUES_PER_LANDMARK)
        .take(POSE_LANDMARK_COUNT)
        .map(|row| {
            let (px, py) = roi.to_frame(row[0] as f64 / input, row[1] as f64 / input);
            LandmarkPoint {
                x: px / fw,
                y: py / fh,
                z: row[2] as f64 / input * roi.size / fw,
                visibility: sigmoid(row[3] as f64),
            }
        })
        .collect();

    if points.iter().any(|p| !p.is_finite()) {
        return Ok(None);
    }
    Ok(Some(PoseLandmarks::new(points)?))
}
