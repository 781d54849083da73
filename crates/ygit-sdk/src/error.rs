use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("not a ygit repository (or any parent up to the filesystem root): {0}")]
    NotARepository(PathBuf),

    #[error("repository already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("path is outside the repository: {0}")]
    PathOutsideRepository(PathBuf),

    #[error("not a regular file or directory: {0}")]
    NotARegularFileOrDirectory(PathBuf),

    #[error("failed to stage {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid object id: {0}")]
    InvalidObjectId(#[from] ygit_types::TypeError),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] ygit_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] ygit_index::IndexError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
