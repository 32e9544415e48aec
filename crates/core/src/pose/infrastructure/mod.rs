pub mod execution_provider;
pub mod onnx_pose_estimator;
