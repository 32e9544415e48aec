pub mod domain;
pub mod infrastructure;
pub mod process_playlist_use_case;
pub mod process_video_use_case;
