use std::str::FromStr;

use ygit_crypto::ContentHasher;
use ygit_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw content (file contents).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Reserved for commits. Parsed on read, never written by ygit.
    Commit,
}

impl ObjectKind {
    /// The header tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// The hasher that addresses objects of this kind.
    pub fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Blob => &ContentHasher::BLOB,
            Self::Tree => &ContentHasher::TREE,
            Self::Commit => &ContentHasher::COMMIT,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            other => Err(format!("unknown object kind {other:?}")),
        }
    }
}

/// A stored object: kind tag + payload + declared size.
///
/// `size` is the length recorded in the object header. Objects built in
/// memory always have `size == data.len()`; objects read from disk carry
/// whatever the header declared, since reads do not re-verify content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The payload bytes (without header).
    pub data: Vec<u8>,
    /// The payload size in bytes, as declared by the header.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }

    /// Parse decompressed object bytes.
    ///
    /// Splits on the first NUL into header and payload, then the header on
    /// its first space into kind and declared size.
    pub fn parse(id: &ObjectId, raw: &[u8]) -> StoreResult<Self> {
        let malformed = |reason: String| StoreError::MalformedHeader { id: *id, reason };

        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| malformed("missing NUL after header".into()))?;
        let (header, payload) = (&raw[..nul], &raw[nul + 1..]);

        let space = header
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| malformed("header has no size field".into()))?;
        let kind = std::str::from_utf8(&header[..space])
            .map_err(|_| malformed("kind is not UTF-8".into()))?
            .parse::<ObjectKind>()
            .map_err(malformed)?;
        let size = std::str::from_utf8(&header[space + 1..])
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| malformed("size is not a decimal number".into()))?;

        Ok(Self {
            kind,
            data: payload.to_vec(),
            size,
        })
    }
}
