//! `.part` staging files: bodies are written beside the final name and renamed on success.

use std::path::{Path, PathBuf};

/// Temporary file suffix used before the final rename.
pub const PART_SUFFIX: &str = ".part";

/// Path for the staging file: appends `.part` to the final path (e.g. `file.zip` → `file.zip.part`).
pub fn part_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(PART_SUFFIX);
    PathBuf::from(o)
}

/// Best-effort removal of a staging file after a failed download.
pub(super) fn discard(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("could not remove {}: {}", path.display(), e),
    }
}
