use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;
use ygit_index::{to_index_path, IndexRecord, StagingIndex, TreeBuilder};
use ygit_store::{EntryMode, LooseObjectStore, ObjectKind, ObjectStore};
use ygit_types::{ObjectId, METADATA_DIR};

use crate::config::LOCAL_CONFIG_FILE;
use crate::error::{SdkError, SdkResult};
use crate::inspect::{inspect, InspectMode};
use crate::locate::{absolute, find_root};

/// Name of the index document inside the metadata directory.
pub const INDEX_FILE: &str = "index.json";

/// Branch `HEAD` points at after `init`.
pub const DEFAULT_BRANCH: &str = "main";

/// Paths touched by one staging call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Index paths whose record was added or replaced.
    pub staged: Vec<String>,
    /// Index paths that were already staged with identical content.
    pub unchanged: Vec<String>,
}

impl StageReport {
    /// Returns `true` if the index changed.
    pub fn changed(&self) -> bool {
        !self.staged.is_empty()
    }
}

/// A ygit repository on disk.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    meta_dir: PathBuf,
    store: LooseObjectStore,
}

impl Repository {
    /// Create the metadata layout under `root`.
    ///
    /// `root` is created if needed. Fails if a repository already exists there.
    pub fn init(root: &Path) -> SdkResult<Self> {
        let root = absolute(root)?;
        fs::create_dir_all(&root)?;

        let meta_dir = root.join(METADATA_DIR);
        match fs::create_dir(&meta_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(SdkError::AlreadyInitialized(root));
            }
            Err(e) => return Err(e.into()),
        }

        fs::create_dir(meta_dir.join("objects"))?;
        fs::create_dir_all(meta_dir.join("refs").join("heads"))?;
        fs::write(
            meta_dir.join("HEAD"),
            format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
        )?;
        StagingIndex::new(meta_dir.join(INDEX_FILE)).persist()?;

        info!(root = %root.display(), "initialized repository");
        Ok(Self::at(root))
    }

    /// Open the repository whose root is exactly `root`.
    pub fn open(root: &Path) -> SdkResult<Self> {
        let root = absolute(root)?;
        if !root.join(METADATA_DIR).is_dir() {
            return Err(SdkError::NotARepository(root));
        }
        Ok(Self::at(root))
    }

    /// Open the repository enclosing `start`.
    pub fn discover(start: &Path) -> SdkResult<Self> {
        let root = find_root(start)?;
        debug!(root = %root.display(), "discovered repository");
        Ok(Self::at(root))
    }

    fn at(root: PathBuf) -> Self {
        let meta_dir = root.join(METADATA_DIR);
        let store = LooseObjectStore::new(&meta_dir.join("objects"));
        Self {
            root,
            meta_dir,
            store,
        }
    }

    /// The working directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The metadata directory (`<root>/.ygit`).
    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    /// The object store.
    pub fn store(&self) -> &LooseObjectStore {
        &self.store
    }

    /// Location of the index document.
    pub fn index_path(&self) -> PathBuf {
        self.meta_dir.join(INDEX_FILE)
    }

    /// Location of the repository-local configuration document.
    pub fn local_config_path(&self) -> PathBuf {
        self.meta_dir.join(LOCAL_CONFIG_FILE)
    }

    /// Open the staging index.
    pub fn open_index(&self) -> SdkResult<StagingIndex> {
        Ok(StagingIndex::open(self.index_path())?)
    }

    // ---- Content operations ----

    /// Store the content of a regular file as a blob.
    pub fn store_blob(&self, path: &Path) -> SdkResult<ObjectId> {
        let content = read_regular_file(path)?;
        Ok(self.store.put(ObjectKind::Blob, &content)?)
    }

    /// Stage a file, or every regular file beneath a directory.
    ///
    /// Returns `true` if the index changed.
    pub fn stage(&self, path: &Path) -> SdkResult<bool> {
        Ok(self.stage_path(path)?.changed())
    }

    /// Stage a file, or every regular file beneath a directory, persisting
    /// the index once at the end.
    pub fn stage_path(&self, path: &Path) -> SdkResult<StageReport> {
        let abs = absolute(path)?;
        let meta = match fs::symlink_metadata(&abs) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SdkError::PathNotFound(path.to_path_buf()));
            }
            Err(source) => return Err(SdkError::Staging { path: abs, source }),
        };
        self.relative(&abs)?;

        let mut index = self.open_index()?;
        let mut report = StageReport::default();

        if meta.is_file() {
            self.stage_file(&mut index, &abs, &meta, &mut report)?;
        } else if meta.is_dir() {
            let walker = WalkDir::new(&abs)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.path() != self.meta_dir.as_path());
            for entry in walker {
                let entry = entry.map_err(|e| SdkError::Staging {
                    path: e.path().map(Path::to_path_buf).unwrap_or_else(|| abs.clone()),
                    source: io::Error::from(e),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let meta = entry.metadata().map_err(|e| SdkError::Staging {
                    path: entry.path().to_path_buf(),
                    source: io::Error::from(e),
                })?;
                self.stage_file(&mut index, entry.path(), &meta, &mut report)?;
            }
        } else {
            return Err(SdkError::NotARegularFileOrDirectory(abs));
        }

        if report.changed() {
            index.persist()?;
        }
        Ok(report)
    }

    fn stage_file(
        &self,
        index: &mut StagingIndex,
        abs: &Path,
        meta: &fs::Metadata,
        report: &mut StageReport,
    ) -> SdkResult<()> {
        let rel = self.relative(abs)?;
        let index_path = to_index_path(&rel)
            .ok_or_else(|| SdkError::InvalidOperation(format!("cannot stage {}", abs.display())))?;

        let content = fs::read(abs).map_err(|source| SdkError::Staging {
            path: abs.to_path_buf(),
            source,
        })?;
        let id = self.store.put(ObjectKind::Blob, &content)?;
        let record = IndexRecord::new(
            index_path.clone(),
            id,
            content.len() as u64,
            EntryMode::from_metadata(meta),
        );

        if index.upsert(record)? {
            debug!(path = %index_path, %id, "staged");
            report.staged.push(index_path);
        } else {
            report.unchanged.push(index_path);
        }
        Ok(())
    }

    /// Path of `abs` relative to the root, rejecting paths outside the
    /// working tree and inside the metadata directory. Only the metadata
    /// directory directly under the root is reserved.
    fn relative(&self, abs: &Path) -> SdkResult<PathBuf> {
        let rel = abs
            .strip_prefix(&self.root)
            .map_err(|_| SdkError::PathOutsideRepository(abs.to_path_buf()))?;
        if rel.components().next().is_some_and(|c| c.as_os_str() == METADATA_DIR) {
            return Err(SdkError::InvalidOperation(format!(
                "cannot stage repository metadata: {}",
                abs.display()
            )));
        }
        Ok(rel.to_path_buf())
    }

    // ---- Snapshot operations ----

    /// Build the tree for the working directory from the staging index,
    /// store every tree, and return the root tree's ID.
    pub fn write_tree(&self) -> SdkResult<ObjectId> {
        let index = self.open_index()?;
        let id = TreeBuilder::new(&self.root, &index, &self.store).write_root()?;
        Ok(id)
    }

    /// Describe an object, see [`inspect`].
    pub fn inspect(&self, id: &ObjectId, mode: InspectMode, out: &mut dyn Write) -> SdkResult<()> {
        inspect(&self.store, id, mode, out)
    }
}

/// Compute the blob ID of a regular file without storing it.
pub fn hash_blob(path: &Path) -> SdkResult<ObjectId> {
    let content = read_regular_file(path)?;
    Ok(ObjectKind::Blob.hasher().hash(&content))
}

fn read_regular_file(path: &Path) -> SdkResult<Vec<u8>> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SdkError::PathNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    if !meta.is_file() {
        return Err(SdkError::NotARegularFileOrDirectory(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};
    use ygit_store::{StoreError, Tree};

    fn repo() -> (TempDir, Repository) {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn init_creates_layout() {
        let (dir, repo) = repo();
        let meta = dir.path().join(METADATA_DIR);

        assert!(meta.join("objects").is_dir());
        assert!(meta.join("refs").join("heads").is_dir());
        assert_eq!(
            fs::read_to_string(meta.join("HEAD")).unwrap(),
            "ref: refs/heads/main\n"
        );
        assert_eq!(fs::read_to_string(meta.join(INDEX_FILE)).unwrap().trim(), "[]");
        assert_eq!(repo.meta_dir(), meta);
    }

    #[test]
    fn init_twice_fails() {
        let (dir, _repo) = repo();
        assert!(matches!(
            Repository::init(dir.path()),
            Err(SdkError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn open_requires_metadata() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(SdkError::NotARepository(_))
        ));
    }

    #[test]
    fn discover_from_subdirectory() {
        let (dir, _repo) = repo();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let found = Repository::discover(&nested).unwrap();
        assert_eq!(found.root(), dir.path());
    }

    #[test]
    fn store_blob_and_hash_blob_agree() {
        let (dir, repo) = repo();
        let file = dir.path().join("hello.txt");
        fs::write(&file, b"hello\n").unwrap();

        let hashed = hash_blob(&file).unwrap();
        assert!(!repo.store().exists(&hashed).unwrap());

        let stored = repo.store_blob(&file).unwrap();
        assert_eq!(hashed, stored);
        assert_eq!(stored.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(repo.store().exists(&stored).unwrap());
    }

    #[test]
    fn store_blob_rejects_directory() {
        let (dir, repo) = repo();
        assert!(matches!(
            repo.store_blob(dir.path()),
            Err(SdkError::NotARegularFileOrDirectory(_))
        ));
        assert!(matches!(
            hash_blob(&dir.path().join("missing")),
            Err(SdkError::PathNotFound(_))
        ));
    }

    #[test]
    fn stage_file_records_blob() {
        let (dir, repo) = repo();
        let file = dir.path().join("x.txt");
        fs::write(&file, b"one").unwrap();

        assert!(repo.stage(&file).unwrap());
        assert!(!repo.stage(&file).unwrap());

        let index = repo.open_index().unwrap();
        let record = index.get("x.txt").unwrap();
        assert_eq!(record.size, 3);
        assert_eq!(record.mode, EntryMode::Regular);
        assert_eq!(record.content_hash, hash_blob(&file).unwrap());
        assert!(repo.store().exists(&record.content_hash).unwrap());
    }

    #[test]
    fn restage_updates_hash_in_place() {
        let (dir, repo) = repo();
        fs::write(dir.path().join("x.txt"), b"H1").unwrap();
        fs::write(dir.path().join("y.txt"), b"y").unwrap();
        repo.stage(&dir.path().join("x.txt")).unwrap();
        repo.stage(&dir.path().join("y.txt")).unwrap();

        fs::write(dir.path().join("x.txt"), b"H2").unwrap();
        assert!(repo.stage(&dir.path().join("x.txt")).unwrap());

        let index = repo.open_index().unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.records()[0].path, "x.txt");
        assert_eq!(
            index.records()[0].content_hash,
            ObjectKind::Blob.hasher().hash(b"H2")
        );
    }

    #[test]
    fn stage_directory_walks_files_and_skips_metadata() {
        let (dir, repo) = repo();
        fs::create_dir_all(dir.path().join("src").join("nested")).unwrap();
        fs::write(dir.path().join("src").join("lib.rs"), b"lib").unwrap();
        fs::write(dir.path().join("src").join("nested").join("mod.rs"), b"mod").unwrap();
        fs::write(dir.path().join("top.txt"), b"top").unwrap();

        let report = repo.stage_path(dir.path()).unwrap();
        assert_eq!(report.staged, ["src/lib.rs", "src/nested/mod.rs", "top.txt"]);
        assert!(report.unchanged.is_empty());

        let again = repo.stage_path(&dir.path().join("src")).unwrap();
        assert!(!again.changed());
        assert_eq!(again.unchanged.len(), 2);

        let index = repo.open_index().unwrap();
        assert!(index.records().iter().all(|r| !r.path.starts_with(METADATA_DIR)));
    }

    #[test]
    fn nested_metadata_name_is_staged_like_any_directory() {
        let (dir, repo) = repo();
        let nested = dir.path().join("vendor").join(METADATA_DIR);
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("note.txt"), b"note").unwrap();

        let report = repo.stage_path(dir.path()).unwrap();
        assert_eq!(report.staged, ["vendor/.ygit/note.txt"]);
        assert!(repo.stage(&nested.join("note.txt")).is_ok());

        let root_id = repo.write_tree().unwrap();
        let mut out = Vec::new();
        repo.inspect(&root_id, InspectMode::PrettyRecursive, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\t.ygit\n"));
        assert!(text.contains("\tnote.txt\n"));
    }

    #[test]
    fn stage_rejects_paths_outside_repository() {
        let (_dir, repo) = repo();
        let other = tempdir().unwrap();
        let file = other.path().join("elsewhere.txt");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            repo.stage(&file),
            Err(SdkError::PathOutsideRepository(_))
        ));
    }

    #[test]
    fn stage_rejects_metadata_and_missing_paths() {
        let (dir, repo) = repo();
        assert!(matches!(
            repo.stage(&dir.path().join(METADATA_DIR).join("HEAD")),
            Err(SdkError::InvalidOperation(_))
        ));
        assert!(matches!(
            repo.stage(&dir.path().join("nope.txt")),
            Err(SdkError::PathNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn stage_rejects_symlink() {
        let (dir, repo) = repo();
        fs::write(dir.path().join("target.txt"), b"t").unwrap();
        std::os::unix::fs::symlink("target.txt", dir.path().join("link")).unwrap();

        assert!(matches!(
            repo.stage(&dir.path().join("link")),
            Err(SdkError::NotARegularFileOrDirectory(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn stage_records_executable_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, repo) = repo();
        let script = dir.path().join("run.sh");
        fs::write(&script, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        repo.stage(&script).unwrap();
        let index = repo.open_index().unwrap();
        assert_eq!(index.get("run.sh").unwrap().mode, EntryMode::Executable);
    }

    #[test]
    fn write_tree_snapshots_staged_content() {
        let (dir, repo) = repo();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), b"beta").unwrap();
        fs::write(dir.path().join("untracked.txt"), b"nope").unwrap();
        repo.stage(&dir.path().join("a.txt")).unwrap();
        repo.stage(&dir.path().join("sub").join("b.txt")).unwrap();

        let root_id = repo.write_tree().unwrap();
        let root = Tree::from_stored_object(&repo.store().get(&root_id).unwrap()).unwrap();
        let names: Vec<_> = root.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "sub"]);

        let sub_id = root.get("sub").unwrap().object_id;
        assert!(repo.store().exists(&sub_id).unwrap());

        let mut out = Vec::new();
        repo.inspect(&root_id, InspectMode::PrettyRecursive, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\ta.txt\n"));
        assert!(text.contains("\n 100644 blob "));
        assert!(!text.contains("untracked"));
    }

    #[test]
    fn write_tree_of_empty_index_is_empty_tree() {
        let (_dir, repo) = repo();
        let id = repo.write_tree().unwrap();
        assert_eq!(id.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn inspect_unknown_object() {
        let (_dir, repo) = repo();
        let mut out = Vec::new();
        let err = repo
            .inspect(&ObjectId::from_hash([1; 20]), InspectMode::Type, &mut out)
            .unwrap_err();
        assert!(matches!(err, SdkError::Store(StoreError::NotFound(_))));
    }
}
