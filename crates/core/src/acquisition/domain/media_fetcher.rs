use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures while bringing a source video to local disk. Kept apart from
/// pipeline errors so callers can report them separately.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("fetch reported success but {0} does not exist")]
    MissingOutput(PathBuf),
    #[error("source {0} does not exist")]
    SourceNotFound(PathBuf),
    #[error("cannot prepare {dir}: {source}")]
    Prepare {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Domain interface for acquiring a source video.
pub trait MediaFetcher: Send {
    /// Places the video named by `locator` at exactly `dest`.
    fn fetch(&self, locator: &str, dest: &Path) -> Result<(), FetchError>;
}
