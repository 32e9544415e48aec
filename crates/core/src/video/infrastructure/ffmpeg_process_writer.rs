use std::collections::VecDeque;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use crate::shared::constants::DEFAULT_FFMPEG_BINARY;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Lines of encoder stderr kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// How the external encoder is invoked.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderSettings {
    pub binary: PathBuf,
    pub video_codec: String,
    pub preset: String,
    /// Constant rate factor; the codec default is used when `None`.
    pub crf: Option<u32>,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_FFMPEG_BINARY),
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            crf: None,
        }
    }
}

impl EncoderSettings {
    /// Arguments for reading raw RGB24 frames from stdin, taking audio from
    /// the source file untouched and stopping at the shorter of the two.
    pub fn args(&self, metadata: &VideoMetadata, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |s: &str| args.push(OsString::from(s));

        push("-y");
        push("-loglevel");
        push("error");
        push("-f");
        push("rawvideo");
        push("-vcodec");
        push("rawvideo");
        push("-s");
        push(&format!("{}x{}", metadata.width, metadata.height));
        push("-pix_fmt");
        push("rgb24");
        push("-r");
        push(&format!("{}", metadata.fps));
        push("-i");
        push("-");

        if let Some(source) = &metadata.source_path {
            args.push("-i".into());
            args.push(source.as_os_str().to_os_string());
            args.extend(["-map", "0:v", "-map", "1:a?"].map(OsString::from));
        }

        args.extend(
            ["-c:v", self.video_codec.as_str(), "-preset", self.preset.as_str()].map(OsString::from),
        );
        if let Some(crf) = self.crf {
            args.push("-crf".into());
            args.push(crf.to_string().into());
        }
        args.extend(["-pix_fmt", "yuv420p", "-c:a", "copy", "-shortest"].map(OsString::from));
        args.push(output.as_os_str().to_os_string());
        args
    }
}

/// Encodes frames by piping raw bytes into an `ffmpeg` child process, which
/// also copies the audio track over from the source file.
pub struct FfmpegProcessWriter {
    settings: EncoderSettings,
    session: Option<EncoderSession>,
    frame_bytes: usize,
    frames_written: usize,
}

impl FfmpegProcessWriter {
    pub fn new(settings: EncoderSettings) -> Self {
        Self {
            settings,
            session: None,
            frame_bytes: 0,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

impl Default for FfmpegProcessWriter {
    fn default() -> Self {
        Self::new(EncoderSettings::default())
    }
}

impl VideoWriter for FfmpegProcessWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.session.is_some() {
            return Err("FfmpegProcessWriter: already open".into());
        }
        metadata.validate()?;

        let args = self.settings.args(metadata, path);
        log::debug!(
            "Spawning {} {}",
            self.settings.binary.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        self.session = Some(EncoderSession::spawn(&self.settings.binary, &args)?);
        self.frame_bytes = Frame::byte_len(metadata.width, metadata.height);
        self.frames_written = 0;
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let session = self
            .session
            .as_mut()
            .ok_or("FfmpegProcessWriter: not opened")?;

        if frame.data().len() != self.frame_bytes {
            return Err(format!(
                "frame {} has {} bytes, encoder expects {}",
                frame.index(),
                frame.data().len(),
                self.frame_bytes
            )
            .into());
        }

        session.write_all(frame.data())?;
        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        let (status, stderr_tail) = session.finish()?;
        if !status.success() {
            return Err(format!("encoder exited with {status}: {stderr_tail}").into());
        }

        log::debug!("Encoder finished after {} frames", self.frames_written);
        Ok(())
    }
}

/// A live encoder process and its input pipe.
///
/// Stdin is closed and the child reaped on every exit path: `finish` on the
/// normal path and `Drop` otherwise.
struct EncoderSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<String>>,
    exit: Option<ExitStatus>,
}

impl EncoderSession {
    fn spawn(binary: &Path, args: &[OsString]) -> Result<Self, Box<dyn std::error::Error>> {
        let mut child = Command::new(binary)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {e}", binary.display()))?;

        let stdin = child.stdin.take();
        let stderr_drain = child.stderr.take().map(|stderr| {
            std::thread::spawn(move || {
                let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    log::debug!("ffmpeg: {line}");
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                Vec::from(tail).join("\n")
            })
        });

        Ok(Self {
            child,
            stdin,
            stderr_drain,
            exit: None,
        })
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let stdin = self.stdin.as_mut().ok_or("encoder input already closed")?;
        if let Err(e) = stdin.write_all(bytes) {
            let exited = match self.child.try_wait() {
                Ok(Some(status)) => format!(" (encoder exited with {status})"),
                _ => String::new(),
            };
            return Err(format!("write to encoder failed: {e}{exited}").into());
        }
        Ok(())
    }

    fn finish(&mut self) -> std::io::Result<(ExitStatus, String)> {
        drop(self.stdin.take());
        let status = match self.exit {
            Some(status) => status,
            None => {
                let status = self.child.wait()?;
                self.exit = Some(status);
                status
            }
        };
        let tail = self
            .stderr_drain
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        Ok((status, tail))
    }
}

impl Drop for EncoderSession {
    fn drop(&mut self) {
        if self.exit.is_none() {
            if let Err(e) = self.finish() {
                log::warn!("Failed to reap encoder process: {e}");
            }
        }
    }
}
