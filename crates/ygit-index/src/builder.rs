//! Tree construction from the staging index.
//!
//! [`TreeBuilder`] walks the working directory. Each level is built in two
//! phases: child subtrees are stored through the injected [`ObjectStore`]
//! first, then the level's own entries are encoded. Staged files contribute
//! their recorded hash and mode; files that are not staged are left out.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use ygit_store::{EntryMode, ObjectKind, ObjectStore, Tree, TreeEntry};
use ygit_types::{ObjectId, METADATA_DIR};

use crate::entry::{to_index_path, IndexRecord};
use crate::error::IndexResult;
use crate::index::StagingIndex;

/// Builds tree objects for a working directory from its staging index.
pub struct TreeBuilder<'a> {
    root: &'a Path,
    store: &'a dyn ObjectStore,
    staged: HashMap<&'a str, &'a IndexRecord>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder for the working directory at `root`.
    pub fn new(root: &'a Path, index: &'a StagingIndex, store: &'a dyn ObjectStore) -> Self {
        let staged = index
            .records()
            .iter()
            .map(|r| (r.path.as_str(), r))
            .collect();
        Self {
            root,
            store,
            staged,
        }
    }

    /// Build the tree for `dir`, storing every subtree on the way.
    ///
    /// Children are visited in name order. The metadata directory directly
    /// under the root is never descended into; symlinks and other special
    /// files are skipped.
    fn build_tree(&self, dir: &Path) -> IndexResult<Tree> {
        let mut children = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
        children.sort_by_key(|child| child.file_name());

        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            let path = child.path();
            let file_name = child.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(path = %path.display(), "skipping non-UTF-8 name");
                continue;
            };

            let file_type = child.file_type()?;
            if file_type.is_dir() {
                if name == METADATA_DIR && dir == self.root {
                    continue;
                }
                let payload = self.build(&path)?;
                let id = self.store.put(ObjectKind::Tree, &payload)?;
                entries.push(TreeEntry::new(EntryMode::Directory, name, id));
            } else if file_type.is_file() {
                let record = path
                    .strip_prefix(self.root)
                    .ok()
                    .and_then(to_index_path)
                    .and_then(|rel| self.staged.get(rel.as_str()).copied());
                match record {
                    Some(record) => entries.push(TreeEntry::new(
                        record.mode.clone(),
                        name,
                        record.content_hash,
                    )),
                    None => debug!(path = %path.display(), "not staged, omitted from tree"),
                }
            } else {
                debug!(path = %path.display(), "skipping special file");
            }
        }

        Ok(Tree::new(entries))
    }

    /// Build the unwrapped tree payload for `dir`. Subtrees are stored,
    /// the payload itself is not.
    pub fn build(&self, dir: &Path) -> IndexResult<Vec<u8>> {
        Ok(self.build_tree(dir)?.encode())
    }

    /// Build and store the tree for the whole working directory.
    pub fn write_root(&self) -> IndexResult<ObjectId> {
        let payload = self.build(self.root)?;
        let id = self.store.put(ObjectKind::Tree, &payload)?;
        debug!(%id, bytes = payload.len(), "stored root tree");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};
    use ygit_store::InMemoryObjectStore;

    fn workdir() -> TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(METADATA_DIR).join("objects")).unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        fs::write(dir.path().join("unstaged.txt"), b"ignored").unwrap();
        fs::create_dir_all(dir.path().join("sub").join("deep")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), b"beta").unwrap();
        fs::write(dir.path().join("sub").join("deep").join("c.txt"), b"gamma").unwrap();
        dir
    }

    fn stage(
        index: &mut StagingIndex,
        store: &InMemoryObjectStore,
        path: &str,
        content: &[u8],
    ) -> ObjectId {
        let id = store.put(ObjectKind::Blob, content).unwrap();
        index
            .upsert(IndexRecord::new(path, id, content.len() as u64, EntryMode::Regular))
            .unwrap();
        id
    }

    #[test]
    fn root_tree_contains_staged_files_and_subtrees() {
        let dir = workdir();
        let store = InMemoryObjectStore::new();
        let mut index = StagingIndex::new(dir.path().join("index.json"));
        let a = stage(&mut index, &store, "a.txt", b"alpha");
        stage(&mut index, &store, "sub/b.txt", b"beta");

        let builder = TreeBuilder::new(dir.path(), &index, &store);
        let tree = builder.build_tree(dir.path()).unwrap();

        let names: Vec<_> = tree.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "sub"]);
        assert_eq!(tree.get("a.txt").unwrap().object_id, a);
        assert_eq!(tree.get("sub").unwrap().mode, EntryMode::Directory);
    }

    #[test]
    fn subtrees_are_stored_eagerly() {
        let dir = workdir();
        let store = InMemoryObjectStore::new();
        let mut index = StagingIndex::new(dir.path().join("index.json"));
        let b = stage(&mut index, &store, "sub/b.txt", b"beta");
        let c = stage(&mut index, &store, "sub/deep/c.txt", b"gamma");

        let builder = TreeBuilder::new(dir.path(), &index, &store);
        let root = builder.build_tree(dir.path()).unwrap();

        let sub_id = root.get("sub").unwrap().object_id;
        let sub = Tree::from_stored_object(&store.get(&sub_id).unwrap()).unwrap();
        assert_eq!(sub.get("b.txt").unwrap().object_id, b);

        let deep_id = sub.get("deep").unwrap().object_id;
        let deep = Tree::from_stored_object(&store.get(&deep_id).unwrap()).unwrap();
        assert_eq!(deep.entries, vec![TreeEntry::new(EntryMode::Regular, "c.txt", c)]);
    }

    #[test]
    fn unstaged_files_are_omitted() {
        let dir = workdir();
        let store = InMemoryObjectStore::new();
        let index = StagingIndex::new(dir.path().join("index.json"));

        let builder = TreeBuilder::new(dir.path(), &index, &store);
        let root = builder.build_tree(dir.path()).unwrap();

        assert!(root.get("a.txt").is_none());
        assert!(root.get("unstaged.txt").is_none());
        // Directories always appear, even with nothing staged beneath them.
        assert_eq!(root.len(), 1);
        assert!(root.get("sub").is_some());
    }

    #[test]
    fn metadata_directory_is_skipped() {
        let dir = workdir();
        let store = InMemoryObjectStore::new();
        let index = StagingIndex::new(dir.path().join("index.json"));

        let root = TreeBuilder::new(dir.path(), &index, &store)
            .build_tree(dir.path())
            .unwrap();
        assert!(root.get(METADATA_DIR).is_none());
    }

    #[test]
    fn nested_metadata_name_is_ordinary_directory() {
        let dir = workdir();
        let nested = dir.path().join("sub").join(METADATA_DIR);
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("note.txt"), b"note").unwrap();
        let store = InMemoryObjectStore::new();
        let mut index = StagingIndex::new(dir.path().join("index.json"));
        let note = stage(&mut index, &store, "sub/.ygit/note.txt", b"note");

        let builder = TreeBuilder::new(dir.path(), &index, &store);
        let root = builder.build_tree(dir.path()).unwrap();
        let sub_id = root.get("sub").unwrap().object_id;
        let sub = Tree::from_stored_object(&store.get(&sub_id).unwrap()).unwrap();
        let nested_id = sub.get(METADATA_DIR).unwrap().object_id;
        let nested = Tree::from_stored_object(&store.get(&nested_id).unwrap()).unwrap();
        assert_eq!(nested.get("note.txt").unwrap().object_id, note);
    }

    #[test]
    fn staged_mode_is_used() {
        let dir = workdir();
        let store = InMemoryObjectStore::new();
        let mut index = StagingIndex::new(dir.path().join("index.json"));
        let id = store.put(ObjectKind::Blob, b"alpha").unwrap();
        index
            .upsert(IndexRecord::new("a.txt", id, 5, EntryMode::Executable))
            .unwrap();

        let root = TreeBuilder::new(dir.path(), &index, &store)
            .build_tree(dir.path())
            .unwrap();
        assert_eq!(root.get("a.txt").unwrap().mode, EntryMode::Executable);
    }

    #[test]
    fn build_returns_unwrapped_payload() {
        let dir = workdir();
        let store = InMemoryObjectStore::new();
        let mut index = StagingIndex::new(dir.path().join("index.json"));
        stage(&mut index, &store, "a.txt", b"alpha");

        let builder = TreeBuilder::new(dir.path(), &index, &store);
        let payload = builder.build(dir.path()).unwrap();
        assert!(payload.starts_with(b"100644 a.txt\0"));
        assert_eq!(Tree::decode(&payload).unwrap(), builder.build_tree(dir.path()).unwrap());
    }

    #[test]
    fn write_root_stores_root_and_is_deterministic() {
        let dir = workdir();
        let store = InMemoryObjectStore::new();
        let mut index = StagingIndex::new(dir.path().join("index.json"));
        stage(&mut index, &store, "a.txt", b"alpha");
        stage(&mut index, &store, "sub/deep/c.txt", b"gamma");

        let builder = TreeBuilder::new(dir.path(), &index, &store);
        let first = builder.write_root().unwrap();
        let second = builder.write_root().unwrap();

        assert_eq!(first, second);
        let root = store.get(&first).unwrap();
        assert_eq!(root.kind, ObjectKind::Tree);
        // 2 blobs + root + sub + deep
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn identical_subtrees_share_an_id() {
        let dir = tempdir().unwrap();
        for sub in ["one", "two"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            fs::write(dir.path().join(sub).join("same.txt"), b"same").unwrap();
        }
        let store = InMemoryObjectStore::new();
        let mut index = StagingIndex::new(dir.path().join("index.json"));
        stage(&mut index, &store, "one/same.txt", b"same");
        stage(&mut index, &store, "two/same.txt", b"same");

        let root = TreeBuilder::new(dir.path(), &index, &store)
            .build_tree(dir.path())
            .unwrap();
        assert_eq!(
            root.get("one").unwrap().object_id,
            root.get("two").unwrap().object_id
        );
    }
}
