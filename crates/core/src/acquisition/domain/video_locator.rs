use std::path::Path;

/// True for `http://` and `https://` locators.
pub fn is_remote(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Derives the video id used to name every artifact of a run.
///
/// Remote locators: `…?v=<id>&…`, `youtu.be/<id>?…` and `shorts/<id>?…`,
/// checked in that order; anything else yields `None`, as does an id with
/// characters outside `[A-Za-z0-9_-]`. Local paths yield their file stem.
pub fn video_id_from_locator(locator: &str) -> Option<String> {
    let locator = locator.trim();
    if !is_remote(locator) {
        return Path::new(locator)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
    }

    let id = if let Some((_, rest)) = locator.split_once("v=") {
        rest.split('&').next()
    } else if let Some((_, rest)) = locator.split_once("youtu.be/") {
        rest.split('?').next()
    } else if let Some((_, rest)) = locator.split_once("shorts/") {
        rest.split('?').next()
    } else {
        None
    };

    id.filter(|id| is_valid_video_id(id)).map(str::to_string)
}

/// Ids become file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
