//! Wishlist.

use std::sync::Arc;

use tracing::instrument;

use bazaar_core::{Product, ProductId, WishlistEntry};

use super::PersistedCollection;
use crate::storage::{Storage, StorageError, keys};

/// Saved products, at most one entry per product id.
pub struct WishlistStore {
    entries: PersistedCollection<WishlistEntry>,
}

impl WishlistStore {
    /// Rehydrate the wishlist from durable storage.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        Self {
            entries: PersistedCollection::load(storage, keys::WISHLIST),
        }
    }

    /// Save `product`. Returns `false` if it was already saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be persisted.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&self, product: &Product) -> Result<bool, StorageError> {
        self.entries.update(|entries| {
            if entries.iter().any(|entry| entry.id() == product.id) {
                return false;
            }
            entries.push(WishlistEntry::from(product.clone()));
            true
        })
    }

    /// Remove the entry for `id`. Returns whether an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be persisted.
    #[instrument(skip(self))]
    pub fn remove(&self, id: ProductId) -> Result<bool, StorageError> {
        self.entries.update(|entries| {
            let before = entries.len();
            entries.retain(|entry| entry.id() != id);
            entries.len() != before
        })
    }

    /// Remove `product` if saved, save it otherwise.
    ///
    /// Returns whether the product is saved afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be persisted.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn toggle(&self, product: &Product) -> Result<bool, StorageError> {
        let mut saved = false;
        self.entries.update(|entries| {
            match entries.iter().position(|entry| entry.id() == product.id) {
                Some(index) => {
                    entries.remove(index);
                }
                None => {
                    entries.push(WishlistEntry::from(product.clone()));
                    saved = true;
                }
            }
            true
        })?;
        Ok(saved)
    }

    /// Empty the wishlist and delete its durable key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be deleted.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), StorageError> {
        self.entries.clear()
    }

    /// Whether `id` is saved.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.entries
            .read(|entries| entries.iter().any(|entry| entry.id() == id))
    }

    /// Copy of all entries in the order they were saved.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.entries.snapshot()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read(<[WishlistEntry]>::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
