pub mod media_fetcher;
pub mod video_locator;
