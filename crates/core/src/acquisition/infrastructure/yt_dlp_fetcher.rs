use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::acquisition::domain::media_fetcher::{FetchError, MediaFetcher};
use crate::shared::constants::{DEFAULT_YT_DLP_BINARY, YT_DLP_FORMAT};

/// Lines of yt-dlp stderr kept for error messages.
const STDERR_TAIL_LINES: usize = 20;

/// Downloads remote videos by running `yt-dlp` as a child process.
pub struct YtDlpFetcher {
    binary: PathBuf,
    format: String,
}

impl YtDlpFetcher {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            format: YT_DLP_FORMAT.to_string(),
        }
    }

    pub fn args(&self, url: &str, dest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-f",
            self.format.as_str(),
            "--no-playlist",
            "-q",
            "--no-warnings",
            "-o",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(dest.as_os_str().to_owned());
        args.push(OsString::from(url));
        args
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_YT_DLP_BINARY)
    }
}

impl MediaFetcher for YtDlpFetcher {
    fn fetch(&self, locator: &str, dest: &Path) -> Result<(), FetchError> {
        let program = self.binary.display().to_string();
        log::info!("Downloading {locator}");

        let output = Command::new(&self.binary)
            .args(self.args(locator, dest))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| FetchError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(FetchError::Failed {
                program,
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }
        if !dest.is_file() {
            return Err(FetchError::MissingOutput(dest.to_path_buf()));
        }

        log::debug!("Downloaded {locator} to {}", dest.display());
        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
