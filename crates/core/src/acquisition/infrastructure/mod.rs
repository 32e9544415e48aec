pub mod local_file_fetcher;
pub mod yt_dlp_fetcher;
