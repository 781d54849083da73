//! Repository discovery.

use std::path::{Component, Path, PathBuf};

use ygit_types::METADATA_DIR;

use crate::error::{SdkError, SdkResult};

/// Find the repository root enclosing `start`.
///
/// Checks `start` and then each ancestor for a metadata directory, stopping
/// with [`SdkError::NotARepository`] once the filesystem root has been tried.
pub fn find_root(start: &Path) -> SdkResult<PathBuf> {
    let start = absolute(start)?;
    let mut current = start.as_path();
    loop {
        if current.join(METADATA_DIR).is_dir() {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return Err(SdkError::NotARepository(start)),
        }
    }
}

/// Make `path` absolute against the working directory and resolve `.` and
/// `..` lexically. Symlinks are not followed.
pub(crate) fn absolute(path: &Path) -> SdkResult<PathBuf> {
    let path = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}
