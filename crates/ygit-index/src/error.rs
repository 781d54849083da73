//! Error types for the index crate.

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Reading, writing or replacing the index document failed.
    #[error("index I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The records could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] ygit_store::StoreError),

    /// An invalid path was provided.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
