//! Index record types.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use ygit_store::EntryMode;
use ygit_types::ObjectId;

/// A staged path in the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Repository-relative path, `/`-separated.
    pub path: String,
    /// ID of the file's blob in the object store.
    pub content_hash: ObjectId,
    /// File size in bytes.
    pub size: u64,
    /// File mode recorded at staging time.
    pub mode: EntryMode,
}

impl IndexRecord {
    /// Create a new index record.
    pub fn new(
        path: impl Into<String>,
        content_hash: ObjectId,
        size: u64,
        mode: EntryMode,
    ) -> Self {
        Self {
            path: path.into(),
            content_hash,
            size,
            mode,
        }
    }
}

/// Convert a repository-relative filesystem path into index form.
///
/// Components are joined with `/` regardless of platform. Returns `None` for
/// empty paths, paths with root, prefix, `.` or `..` components, and
/// non-UTF-8 names.
pub fn to_index_path(rel: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
