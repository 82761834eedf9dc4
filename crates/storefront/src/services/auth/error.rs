//! Authentication error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username missing or blank.
    #[error("username is required")]
    EmptyUsername,

    /// Password missing.
    #[error("password is required")]
    EmptyPassword,

    /// Registration password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Signed-in user could not be persisted.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
