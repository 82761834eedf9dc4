//! Generic persisted collection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::storage::{Storage, StorageError, load_json, save_json};

/// An ordered collection mirrored to one durable key.
///
/// A mutation holds the collection's lock for the whole
/// mutate-then-flush step. It edits a copy, writes the copy, and only then
/// replaces the in-memory items, so a failed write leaves both sides as
/// they were.
pub struct PersistedCollection<T> {
    key: &'static str,
    storage: Arc<dyn Storage>,
    items: Mutex<Vec<T>>,
}

impl<T> PersistedCollection<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Rehydrate from `key`, falling back to an empty collection.
    pub fn load(storage: Arc<dyn Storage>, key: &'static str) -> Self {
        let items: Vec<T> = load_json(storage.as_ref(), key).unwrap_or_default();
        tracing::debug!(key, count = items.len(), "Rehydrated collection");
        Self {
            key,
            storage,
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `mutate` and persist the result if it reports a change.
    ///
    /// Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable write fails; the collection is then
    /// left untouched.
    pub fn update(&self, mutate: impl FnOnce(&mut Vec<T>) -> bool) -> Result<bool, StorageError> {
        let mut items = self.lock();
        let mut next = items.clone();
        if !mutate(&mut next) {
            return Ok(false);
        }
        save_json(self.storage.as_ref(), self.key, &next)?;
        *items = next;
        Ok(true)
    }

    /// Empty the collection and delete its durable key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be deleted; the collection is then
    /// left untouched.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut items = self.lock();
        self.storage.remove(self.key)?;
        items.clear();
        Ok(())
    }

    /// Run `read` against the current items.
    pub fn read<R>(&self, read: impl FnOnce(&[T]) -> R) -> R {
        read(&self.lock())
    }

    /// Copy of the current items.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().clone()
    }

    /// The durable key this collection is mirrored to.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }
}
