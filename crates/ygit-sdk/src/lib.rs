//! High-level SDK for ygit.
//!
//! Ties the object store, tree codec and staging index together behind a
//! [`Repository`] handle. This is the surface the `ygit` binary is written
//! against; argument parsing and printing stay in the CLI.

pub mod config;
pub mod error;
pub mod inspect;
pub mod locate;
pub mod repository;

pub use config::{global_config_path, Config, ConfigScope};
pub use error::{SdkError, SdkResult};
pub use inspect::{inspect, InspectMode};
pub use locate::find_root;
pub use repository::{hash_blob, Repository, StageReport};

// Re-export key types
pub use ygit_index::{IndexRecord, StagingIndex};
pub use ygit_store::{EntryMode, ObjectKind, ObjectStore, Tree, TreeEntry};
pub use ygit_types::{ObjectId, METADATA_DIR};
