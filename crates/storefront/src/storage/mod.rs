//! Durable key-value storage for cart, wishlist and user state.
//!
//! Values are JSON documents stored under a fixed key. An absent key always
//! means "empty default"; so does a document that no longer parses, which is
//! logged and otherwise ignored.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage keys for the persisted state containers.
pub mod keys {
    /// Key for the signed-in user record.
    pub const USER: &str = "user";

    /// Key for the cart line items.
    pub const CART: &str = "cart";

    /// Key for the wishlist entries.
    pub const WISHLIST: &str = "wishlist";
}

/// Errors that can occur when reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Value could not be serialized.
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters that cannot be stored.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A per-user durable key-value store.
///
/// All operations are synchronous: when `set` or `remove` returns `Ok`, the
/// change is durable and visible to every subsequent `get`.
pub trait Storage: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write does not complete.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion does not complete.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Load and decode the JSON document under `key`.
///
/// Returns `None` when the key is absent, unreadable, or holds malformed JSON.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read durable key, using empty default");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Discarding malformed durable value");
            None
        }
    }
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the write fails.
pub fn save_json<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    storage.set(key, &raw)?;
    debug!(key, bytes = raw.len(), "Persisted durable key");
    Ok(())
}
