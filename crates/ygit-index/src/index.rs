//! The staging index document.
//!
//! The index is an ordered JSON array of [`IndexRecord`]s. A [`StagingIndex`]
//! is an explicit handle on that document: it is opened once, mutated only
//! through its methods, and written back with [`StagingIndex::persist`], which
//! replaces the document atomically.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};
use ygit_store::EntryMode;
use ygit_types::ObjectId;

use crate::entry::IndexRecord;
use crate::error::{IndexError, IndexResult};

/// Handle on the staging index document.
#[derive(Debug)]
pub struct StagingIndex {
    /// Location of the index document.
    path: PathBuf,
    /// Staged records, in first-staged order. At most one per path.
    records: Vec<IndexRecord>,
}

impl StagingIndex {
    /// Create an empty index bound to `path` without touching the disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Open the index document at `path`.
    ///
    /// A missing or unparsable document opens as an empty index.
    pub fn open(path: impl Into<PathBuf>) -> IndexResult<Self> {
        let path = path.into();
        let records = Self::load(&path)?;
        Ok(Self { path, records })
    }

    /// Read the records stored at `path`.
    ///
    /// Missing and unparsable documents yield an empty list; any other I/O
    /// failure is an error.
    pub fn load(path: &Path) -> IndexResult<Vec<IndexRecord>> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no index document, starting empty");
                return Ok(Vec::new());
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(path = %path.display(), "index document is not UTF-8, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&data) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "unparsable index document, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// All records in index order.
    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    /// Number of staged records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the record for a path.
    pub fn get(&self, path: &str) -> Option<&IndexRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    /// Returns `true` if the path is staged.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Insert a record, or replace the existing record for the same path
    /// in place. Does not persist.
    ///
    /// Returns `true` if the index changed.
    pub fn upsert(&mut self, record: IndexRecord) -> IndexResult<bool> {
        if record.path.is_empty() {
            return Err(IndexError::InvalidPath("empty path".to_string()));
        }
        if record.path.starts_with('/') || record.path.contains('\\') {
            return Err(IndexError::InvalidPath(record.path));
        }

        match self.records.iter_mut().find(|r| r.path == record.path) {
            Some(existing) if *existing == record => Ok(false),
            Some(existing) => {
                *existing = record;
                Ok(true)
            }
            None => {
                self.records.push(record);
                Ok(true)
            }
        }
    }

    /// Upsert a record for `path` and persist the index.
    ///
    /// Returns `true` if the index changed.
    pub fn stage(
        &mut self,
        path: &str,
        content_hash: ObjectId,
        size: u64,
        mode: EntryMode,
    ) -> IndexResult<bool> {
        let changed = self.upsert(IndexRecord::new(path, content_hash, size, mode))?;
        self.persist()?;
        Ok(changed)
    }

    /// Write all records to a temp file beside the document, sync it, and
    /// rename it over the document.
    pub fn persist(&self) -> IndexResult<()> {
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| IndexError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| IndexError::Io(e.error))?;

        debug!(path = %self.path.display(), records = self.records.len(), "persisted index");
        Ok(())
    }
}
