pub mod landmark;
pub mod landmark_smoother;
pub mod pose_estimator;
pub mod pose_roi;
