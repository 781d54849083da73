//! Content-addressed object storage for ygit.
//!
//! This crate implements a hash-keyed object store laid out like git's
//! `.git/objects/` directory. Every blob and tree is stored as an immutable
//! object identified by the SHA-1 of its kind-tagged content, zlib-compressed
//! under a `2 hex / 38 hex` fan-out path.
//!
//! # Object Types
//!
//! - [`ObjectKind::Blob`] -- raw file content
//! - [`ObjectKind::Tree`] -- binary-encoded directory listing, see [`Tree`]
//! - [`ObjectKind::Commit`] -- reserved tag, parsed but never produced
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one compressed file per object on disk
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. A put either leaves a complete object file or none (temp file + rename).
//! 3. Putting an object that already exists is a successful no-op.
//! 4. Reads parse structure only; payloads are not re-hashed.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{ObjectKind, StoredObject};
pub use traits::ObjectStore;
pub use tree::{EntryMode, Tree, TreeEntry};
