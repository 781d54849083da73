//! On-disk loose object store.
//!
//! Layout: `<objects_dir>/<2 hex>/<38 hex>`, each file holding the zlib
//! compression of `"<kind> <len>\0" + payload`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use tracing::debug;
use ygit_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Filesystem-backed object store, one compressed file per object.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    /// Root path: `.ygit/objects/`
    root: PathBuf,
}

impl LooseObjectStore {
    /// Create a store rooted at the given objects directory.
    ///
    /// The directory is not created here; fan-out directories are created
    /// lazily on first write.
    pub fn new(objects_dir: &Path) -> Self {
        Self {
            root: objects_dir.to_path_buf(),
        }
    }

    /// Get the filesystem path for an object: `ab/cdef...`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.fan_out();
        self.root.join(dir).join(file)
    }

    /// Compress `header + payload` into a temp file beside `path`, then
    /// rename it into place. The temp file is removed on any failure.
    fn write_object(&self, path: &Path, kind: ObjectKind, payload: &[u8]) -> io::Result<()> {
        let dir = path.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "object path has no parent")
        })?;
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut encoder = ZlibEncoder::new(&mut tmp, Compression::default());
            encoder.write_all(&kind.hasher().header(payload.len()))?;
            encoder.write_all(payload)?;
            encoder.finish()?;
        }
        tmp.as_file().sync_all()?;

        match tmp.persist_noclobber(path) {
            Ok(_) => Ok(()),
            // Another writer stored the same object first.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "object appeared concurrently");
                Ok(())
            }
            Err(e) => Err(e.error),
        }
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut raw = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut raw)
            .map_err(|e| StoreError::DecompressFailure {
                id: *id,
                reason: e.to_string(),
            })?;

        StoredObject::parse(id, &raw).map(Some)
    }

    fn put(&self, kind: ObjectKind, payload: &[u8]) -> StoreResult<ObjectId> {
        let id = kind.hasher().hash(payload);
        let path = self.object_path(&id);

        if path.exists() {
            debug!(%id, %kind, "object already stored");
            return Ok(id);
        }

        self.write_object(&path, kind, payload)?;
        debug!(%id, %kind, size = payload.len(), "stored object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}
