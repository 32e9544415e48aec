use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("cannot read playlist {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid playlist {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// `{"videos": [{"url": "...", "title": "..."}, ...]}`; unknown keys are
/// ignored and every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub videos: Vec<PlaylistEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PlaylistEntry {
    pub url: Option<String>,
    pub title: Option<String>,
}

impl PlaylistEntry {
    /// Title for log lines, falling back to the URL.
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.url.as_deref())
            .unwrap_or("<untitled>")
    }
}

impl Playlist {
    pub fn load(path: &Path) -> Result<Self, PlaylistError> {
        let text = fs::read_to_string(path).map_err(|source| PlaylistError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| PlaylistError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
