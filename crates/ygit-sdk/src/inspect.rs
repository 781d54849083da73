//! Object inspection (`cat-file`).

use std::io::Write;

use ygit_store::{ObjectKind, ObjectStore, StoredObject, Tree};
use ygit_types::ObjectId;

use crate::error::SdkResult;

/// What to print about an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InspectMode {
    /// Payload for blobs; one line per entry for trees.
    Pretty,
    /// Like `Pretty`, expanding subtrees depth-first with a growing indent.
    PrettyRecursive,
    /// The declared payload size.
    Size,
    /// The kind tag.
    Type,
}

/// Write a description of object `id` to `out`.
///
/// Blob and commit payloads are written verbatim with no trailing newline.
/// Tree entries are written as `<mode> <kind> <id>\t<name>`, in encoded order.
pub fn inspect(
    store: &dyn ObjectStore,
    id: &ObjectId,
    mode: InspectMode,
    out: &mut dyn Write,
) -> SdkResult<()> {
    let object = store.get(id)?;
    match mode {
        InspectMode::Size => writeln!(out, "{}", object.size)?,
        InspectMode::Type => writeln!(out, "{}", object.kind)?,
        InspectMode::Pretty => pretty(store, &object, false, "", out)?,
        InspectMode::PrettyRecursive => pretty(store, &object, true, "", out)?,
    }
    Ok(())
}

fn pretty(
    store: &dyn ObjectStore,
    object: &StoredObject,
    recursive: bool,
    prefix: &str,
    out: &mut dyn Write,
) -> SdkResult<()> {
    match object.kind {
        ObjectKind::Blob | ObjectKind::Commit => out.write_all(&object.data)?,
        ObjectKind::Tree => {
            let tree = Tree::from_stored_object(object)?;
            for entry in &tree.entries {
                writeln!(
                    out,
                    "{prefix}{} {} {}\t{}",
                    entry.mode,
                    entry.kind(),
                    entry.object_id,
                    entry.name
                )?;
                if recursive && entry.mode.is_dir() {
                    let child = store.get(&entry.object_id)?;
                    pretty(store, &child, true, &format!("{prefix} "), out)?;
                }
            }
        }
    }
    Ok(())
}
