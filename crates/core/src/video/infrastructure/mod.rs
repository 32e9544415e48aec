pub mod ffmpeg_process_writer;
pub mod ffmpeg_reader;

#[cfg(test)]
pub(crate) mod test_video;
