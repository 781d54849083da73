//! Staging index for ygit.
//!
//! Records which files are staged for the next tree snapshot and builds that
//! snapshot by walking the working directory.
//!
//! # Key Types
//!
//! - [`StagingIndex`] -- ordered, path-keyed records persisted as one JSON document
//! - [`IndexRecord`] -- a staged path with its blob hash, size and mode
//! - [`TreeBuilder`] -- recursive tree construction over the filesystem

pub mod builder;
pub mod entry;
pub mod error;
pub mod index;

pub use builder::TreeBuilder;
pub use entry::{to_index_path, IndexRecord};
pub use error::{IndexError, IndexResult};
pub use index::StagingIndex;
