use ygit_types::ObjectId;

use crate::object::ObjectKind;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The stored bytes are not a valid zlib stream.
    #[error("object {id} could not be decompressed: {reason}")]
    DecompressFailure { id: ObjectId, reason: String },

    /// The decompressed object has no parsable `"<kind> <size>\0"` header.
    #[error("object {id} has invalid format: {reason}")]
    MalformedHeader { id: ObjectId, reason: String },

    /// A tree payload could not be decoded into entries.
    #[error("malformed tree at byte {offset}: {reason}")]
    MalformedTree { offset: usize, reason: String },

    /// The object exists but is not of the kind the caller asked for.
    #[error("object {id} is a {actual}, expected {expected}")]
    UnexpectedKind {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
