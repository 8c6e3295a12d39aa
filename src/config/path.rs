// ABOUTME: Home-relative path expansion for key locations.
// ABOUTME: Handles "~" and "~/..." against an explicit home directory.

use std::path::{Path, PathBuf};

/// Expand a leading `~` against `home`. Other paths are returned unchanged.
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(stripped) = path.strip_prefix("~/") {
        home.join(stripped)
    } else {
        PathBuf::from(path)
    }
}
