use sha1::{Digest, Sha1};
use ygit_types::ObjectId;

/// Kind-tagged SHA-1 content hasher.
///
/// Each hasher carries the object kind tag (`"blob"`, `"tree"`, `"commit"`)
/// that forms the object header `"<kind> <len>\0"`. The header is hashed
/// ahead of the payload, which separates the identifier spaces of the
/// different kinds.
pub struct ContentHasher {
    kind: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self { kind: "blob" };
    /// Hasher for tree objects.
    pub const TREE: Self = Self { kind: "tree" };
    /// Hasher for commit objects (reserved tag).
    pub const COMMIT: Self = Self { kind: "commit" };

    /// The object header for a payload of `len` bytes: `"<kind> <len>\0"`.
    pub fn header(&self, len: usize) -> Vec<u8> {
        format!("{} {}\0", self.kind, len).into_bytes()
    }

    /// Hash a payload under this hasher's kind tag.
    pub fn hash(&self, payload: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(self.header(payload.len()));
        hasher.update(payload);
        ObjectId::from_hash(hasher.finalize().into())
    }
}
