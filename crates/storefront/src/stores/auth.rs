//! Authentication state container.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, instrument};

use crate::models::{AuthState, User};
use crate::storage::{Storage, StorageError, keys, load_json, save_json};

/// Holds the [`AuthState`] and mirrors the signed-in user to durable storage.
pub struct AuthStore {
    storage: Arc<dyn Storage>,
    state: Mutex<AuthState>,
}

impl AuthStore {
    /// Rehydrate: a stored user means `Authenticated`, otherwise `Anonymous`.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let state = load_json::<User>(storage.as_ref(), keys::USER)
            .map_or(AuthState::Anonymous, AuthState::Authenticated);
        Self {
            storage,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.lock().clone()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    /// Enter `LoggingIn`, discarding any previous error.
    pub fn login_start(&self) {
        *self.lock() = AuthState::LoggingIn;
    }

    /// Sign `user` in and persist the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be persisted; the state then
    /// becomes `Failed` with the storage error message.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub fn login_success(&self, user: User) -> Result<(), StorageError> {
        let mut state = self.lock();
        if let Err(e) = save_json(self.storage.as_ref(), keys::USER, &user) {
            *state = AuthState::Failed(e.to_string());
            return Err(e);
        }
        info!(username = %user.username, "User signed in");
        *state = AuthState::Authenticated(user);
        Ok(())
    }

    /// Record a failed login.
    pub fn login_failure(&self, message: impl Into<String>) {
        *self.lock() = AuthState::Failed(message.into());
    }

    /// Sign out locally and delete the stored user.
    ///
    /// The in-memory state is cleared even if the key cannot be deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable key cannot be deleted.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), StorageError> {
        let mut state = self.lock();
        *state = AuthState::Anonymous;
        self.storage.remove(keys::USER)?;
        info!("User signed out");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::UserId;

    use super::*;
    use crate::storage::MemoryStorage;

    fn user() -> User {
        User {
            id: UserId::new(1),
            username: "jo".to_string(),
            email: "jo@example.com".to_string(),
            token: "mock_token_12345".to_string(),
        }
    }

    #[test]
    fn test_starts_anonymous_without_stored_user() {
        let auth = AuthStore::load(Arc::new(MemoryStorage::new()));
        assert_eq!(auth.state(), AuthState::Anonymous);
        assert!(auth.user().is_none());
    }

    #[test]
    fn test_login_success_survives_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let auth = AuthStore::load(storage.clone());
        auth.login_start();
        assert!(auth.state().is_loading());

        auth.login_success(user()).unwrap();
        assert!(auth.is_authenticated());

        let reloaded = AuthStore::load(storage);
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user(), Some(user()));
    }

    #[test]
    fn test_login_failure_sets_error() {
        let auth = AuthStore::load(Arc::new(MemoryStorage::new()));
        auth.login_start();
        auth.login_failure("username is required");

        let state = auth.state();
        assert!(!state.is_authenticated());
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("username is required"));

        auth.login_start();
        assert!(auth.state().error().is_none());
    }

    #[test]
    fn test_logout_clears_state_and_key() {
        let storage = Arc::new(MemoryStorage::new());
        let auth = AuthStore::load(storage.clone());
        auth.login_success(user()).unwrap();

        auth.logout().unwrap();
        assert_eq!(auth.state(), AuthState::Anonymous);
        assert!(!storage.contains_key(keys::USER));
        assert!(load_json::<User>(storage.as_ref(), keys::USER).is_none());
        assert!(!AuthStore::load(storage).is_authenticated());
    }

    #[test]
    fn test_corrupted_user_loads_anonymous() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::USER, "{\"id\":").unwrap();
        assert_eq!(AuthStore::load(storage).state(), AuthState::Anonymous);
    }
}
