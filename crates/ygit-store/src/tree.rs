//! Binary tree codec.
//!
//! A tree payload is a plain concatenation of entries, each encoded as
//! `<octal mode> <name>\0<20 raw digest bytes>`. There is no count prefix and
//! no separator between entries.

use serde::{Deserialize, Serialize};
use ygit_types::{ObjectId, OBJECT_ID_LEN};

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// File mode for a tree entry.
///
/// The four modes ygit writes have their own variants. Any other mode text
/// found in a decoded tree is kept verbatim in [`EntryMode::Other`], so trees
/// written by other tools still decode and re-encode to the same bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000).
    Symlink,
    /// Subtree / directory (0o040000).
    Directory,
    /// Unrecognised mode text, e.g. a decimal `st_mode` such as `33188`.
    Other(String),
}

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;

impl EntryMode {
    fn known_bits(&self) -> Option<u32> {
        match self {
            Self::Regular => Some(0o100644),
            Self::Executable => Some(0o100755),
            Self::Symlink => Some(0o120000),
            Self::Directory => Some(0o040000),
            Self::Other(_) => None,
        }
    }

    /// Parse mode text. Both `40000` and `040000` are the directory mode;
    /// anything unrecognised becomes [`EntryMode::Other`].
    pub fn parse(s: &str) -> Self {
        match parse_octal(s) {
            Some(0o100644) => Self::Regular,
            Some(0o100755) => Self::Executable,
            Some(0o120000) => Self::Symlink,
            Some(0o040000) => Self::Directory,
            _ => Self::Other(s.to_string()),
        }
    }

    /// The mode as written inside tree payloads (no leading zero).
    pub fn as_tree_str(&self) -> String {
        match self {
            Self::Other(raw) => raw.clone(),
            known => format!("{:o}", known.known_bits().unwrap_or_default()),
        }
    }

    /// Returns `true` for the directory mode, including unrecognised octal
    /// modes whose file-type bits denote a directory.
    pub fn is_dir(&self) -> bool {
        match self {
            Self::Directory => true,
            Self::Other(raw) => parse_octal(raw).is_some_and(|bits| bits & S_IFMT == S_IFDIR),
            _ => false,
        }
    }

    /// Derive the mode of a filesystem entry from its (non-followed) metadata.
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        let file_type = meta.file_type();
        if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_symlink() {
            Self::Symlink
        } else if is_executable(meta) {
            Self::Executable
        } else {
            Self::Regular
        }
    }
}

fn parse_octal(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return None;
    }
    u32::from_str_radix(s, 8).ok()
}

#[cfg(unix)]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &std::fs::Metadata) -> bool {
    false
}

/// Zero-padded, as printed when inspecting trees. Unrecognised modes are
/// printed as found.
impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Other(raw) => f.write_str(raw),
            known => write!(f, "{:06o}", known.known_bits().unwrap_or_default()),
        }
    }
}

impl From<EntryMode> for String {
    fn from(mode: EntryMode) -> Self {
        mode.as_tree_str()
    }
}

impl From<String> for EntryMode {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// File mode (regular, executable, symlink, directory).
    pub mode: EntryMode,
    /// Entry name (base name, no path separators). Names that are not
    /// UTF-8 in a decoded payload are converted lossily.
    pub name: String,
    /// Content-addressed ID of the referenced object.
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }

    /// The kind of object this entry points at.
    pub fn kind(&self) -> ObjectKind {
        if self.mode.is_dir() {
            ObjectKind::Tree
        } else {
            ObjectKind::Blob
        }
    }

    /// Length of this entry's encoding in bytes.
    pub fn encoded_len(&self) -> usize {
        self.mode.as_tree_str().len() + 1 + self.name.len() + 1 + OBJECT_ID_LEN
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.mode.as_tree_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.name.as_bytes());
        out.push(0);
        out.extend_from_slice(self.object_id.as_bytes());
    }
}

/// Directory listing object.
///
/// Entries keep the order they were given in. The codec never sorts or
/// deduplicates; canonical ordering is up to whoever builds the entry list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree with the entries in the given order.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Encode the entries into a tree payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.entries.iter().map(TreeEntry::encoded_len).sum());
        for entry in &self.entries {
            entry.encode_into(&mut out);
        }
        out
    }

    /// Decode a tree payload.
    ///
    /// Fails only when an entry's name segment has no terminating NUL or
    /// fewer than 20 bytes remain for its object ID. Mode and name bytes are
    /// otherwise taken as found.
    pub fn decode(payload: &[u8]) -> StoreResult<Self> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < payload.len() {
            let malformed = |reason: &str| StoreError::MalformedTree {
                offset: pos,
                reason: reason.to_string(),
            };
            let rest = &payload[pos..];

            // Without a space there is no name segment to terminate.
            let space = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| malformed("name is not terminated by NUL"))?;
            let after_mode = &rest[space + 1..];
            let nul = after_mode
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| malformed("name is not terminated by NUL"))?;

            let digest = &after_mode[nul + 1..];
            if digest.len() < OBJECT_ID_LEN {
                return Err(malformed("truncated object id"));
            }
            let object_id = ObjectId::from_slice(&digest[..OBJECT_ID_LEN])
                .map_err(|_| malformed("truncated object id"))?;

            entries.push(TreeEntry {
                mode: EntryMode::parse(&String::from_utf8_lossy(&rest[..space])),
                name: String::from_utf8_lossy(&after_mode[..nul]).into_owned(),
                object_id,
            });
            pos += space + 1 + nul + 1 + OBJECT_ID_LEN;
        }

        Ok(Self { entries })
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Tree, self.encode())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Tree {
            return Err(StoreError::UnexpectedKind {
                id: obj.compute_id(),
                expected: ObjectKind::Tree,
                actual: obj.kind,
            });
        }
        Self::decode(&obj.data)
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
