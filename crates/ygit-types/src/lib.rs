//! Foundation types for ygit.
//!
//! Every other ygit crate depends on `ygit-types`. It is intentionally tiny:
//! the only shared vocabulary between the store, the index and the CLI is the
//! [`ObjectId`], the 160-bit address of a stored object.

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{ObjectId, OBJECT_ID_HEX_LEN, OBJECT_ID_LEN};

/// Name of the repository metadata directory at the repository root.
pub const METADATA_DIR: &str = ".ygit";
