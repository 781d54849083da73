use ygit_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same kind and payload always
///   produce the same ID.
/// - `put` of an existing object is a no-op that returns the same ID.
/// - A failed `put` leaves no partially written object behind.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or an undecodable object.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Store a payload under the given kind and return its ID.
    fn put(&self, kind: ObjectKind, payload: &[u8]) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read an object, treating absence as [`StoreError::NotFound`].
    fn get(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    /// Write an already-assembled object and return its ID.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        self.put(object.kind, &object.data)
    }
}
