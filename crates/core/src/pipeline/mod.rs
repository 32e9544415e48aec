pub mod annotate_video_use_case;
pub mod infrastructure;
pub mod pipeline_error;
pub mod pipeline_executor;
pub mod pipeline_logger;
pub mod pipeline_state;

#[cfg(test)]
pub(crate) mod test_support;
