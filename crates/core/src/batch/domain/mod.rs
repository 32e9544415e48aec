pub mod output_layout;
pub mod playlist;
pub mod video_annotator;
