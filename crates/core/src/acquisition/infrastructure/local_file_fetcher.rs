use std::fs;
use std::path::Path;

use crate::acquisition::domain::media_fetcher::{FetchError, MediaFetcher};

/// "Fetches" a video that is already on disk by copying it into place, so
/// the temp-file cleanup never touches the user's original. A source that
/// already is the destination is left as it is.
#[derive(Default)]
pub struct LocalFileFetcher;

impl MediaFetcher for LocalFileFetcher {
    fn fetch(&self, locator: &str, dest: &Path) -> Result<(), FetchError> {
        let source = Path::new(locator);
        if !source.is_file() {
            return Err(FetchError::SourceNotFound(source.to_path_buf()));
        }

        let copy_err = |source_err| FetchError::Copy {
            from: source.to_path_buf(),
            to: dest.to_path_buf(),
            source: source_err,
        };
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(copy_err)?;
        }
        if is_same_file(source, dest) {
            log::debug!("{} is already in place", source.display());
            return Ok(());
        }
        fs::copy(source, dest).map_err(copy_err)?;

        log::debug!("Copied {} to {}", source.display(), dest.display());
        Ok(())
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_into_nested_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        fs::write(&source, b"not really a video").unwrap();
        let dest = dir.path().join("temp").join("clip.mp4");

        LocalFileFetcher
            .fetch(source.to_str().unwrap(), &dest)
            .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"not really a video");
        assert!(source.exists());
    }

    #[test]
    fn test_source_already_at_destination_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("temp");
        fs::create_dir_all(&temp).unwrap();
        let source = temp.join("clip.mp4");
        fs::write(&source, b"the only copy").unwrap();
        // Same file, reached through a different spelling.
        let dest = temp.join(".").join("clip.mp4");

        LocalFileFetcher
            .fetch(source.to_str().unwrap(), &dest)
            .unwrap();

        assert_eq!(fs::read(&source).unwrap(), b"the only copy");
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileFetcher
            .fetch("/nonexistent/clip.mp4", &dir.path().join("clip.mp4"))
            .unwrap_err();
        assert!(matches!(err, FetchError::SourceNotFound(_)));
    }

    #[test]
    fn test_directory_source_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileFetcher
            .fetch(dir.path().to_str().unwrap(), &dir.path().join("x.mp4"))
            .unwrap_err();
        assert!(matches!(err, FetchError::SourceNotFound(_)));
    }
}
