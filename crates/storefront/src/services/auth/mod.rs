//! Authentication service.
//!
//! Sign-in is delegated to an [`Authenticator`]; the service drives the
//! [`AuthStore`] through its transitions around that call and keeps the
//! Sentry user context in step.

mod error;

pub use error::AuthError;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::{info, instrument, warn};

use bazaar_core::{Email, UserId};

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{Credentials, Registration, User};
use crate::stores::AuthStore;

/// Token handed out by [`SimulatedAuthenticator`].
pub const SIMULATED_TOKEN: &str = "mock_token_12345";

/// Exchanges credentials for a signed-in user.
pub trait Authenticator: Send + Sync {
    /// Verify `credentials` and return the user they identify.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;
}

/// Stand-in for a real identity provider.
///
/// Waits a fixed delay, then accepts any non-blank username. The password
/// is never looked at.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedAuthenticator {
    delay: Duration,
}

impl SimulatedAuthenticator {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Authenticator for SimulatedAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let username = credentials.username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }

        tokio::time::sleep(self.delay).await;

        Ok(User {
            id: UserId::new(1),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            token: SIMULATED_TOKEN.to_string(),
        })
    }
}

/// Authentication service.
pub struct AuthService<A = SimulatedAuthenticator> {
    store: Arc<AuthStore>,
    authenticator: A,
}

impl<A: Authenticator> AuthService<A> {
    #[must_use]
    pub const fn new(store: Arc<AuthStore>, authenticator: A) -> Self {
        Self {
            store,
            authenticator,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<AuthStore> {
        &self.store
    }

    /// Sign in with `credentials`.
    ///
    /// The store is `LoggingIn` while the authenticator runs and ends up
    /// `Authenticated` or `Failed`.
    ///
    /// # Errors
    ///
    /// Returns the authenticator's error, or `AuthError::Storage` if the
    /// user cannot be persisted.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        self.store.login_start();

        let user = match self.authenticator.authenticate(credentials).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.store.login_failure(e.to_string());
                return Err(e);
            }
        };

        self.store.login_success(user.clone())?;
        set_sentry_user(&user.id, Some(user.email.as_str()));
        add_breadcrumb("auth", "Signed in", None);
        Ok(user)
    }

    /// Sign out locally. There is no server session to invalidate.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored user cannot be deleted;
    /// the in-memory state is cleared regardless.
    pub fn logout(&self) -> Result<(), AuthError> {
        clear_sentry_user();
        add_breadcrumb("auth", "Signed out", None);
        self.store.logout()?;
        Ok(())
    }

    /// Validate a registration form.
    ///
    /// Nothing is stored; a valid form is only acknowledged.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub fn register(&self, registration: &Registration) -> Result<Email, AuthError> {
        if registration.username.trim().is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        let email = Email::parse(&registration.email)?;
        let password = registration.password.expose_secret();
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        if password != registration.confirm_password.expose_secret() {
            return Err(AuthError::PasswordMismatch);
        }

        info!(email = %email, "Registration accepted");
        Ok(email)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::models::AuthState;
    use crate::storage::{MemoryStorage, Storage, keys};

    fn service() -> (AuthService, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(AuthStore::load(storage.clone()));
        let service = AuthService::new(store, SimulatedAuthenticator::new(Duration::from_secs(1)));
        (service, storage)
    }

    fn registration(email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            username: "jo".to_string(),
            email: email.to_string(),
            password: SecretString::from(password.to_string()),
            confirm_password: SecretString::from(confirm.to_string()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_success() {
        let (service, storage) = service();
        let user = service
            .login(&Credentials::new("jo", "anything"))
            .await
            .unwrap();

        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.email, "jo@example.com");
        assert_eq!(user.token, SIMULATED_TOKEN);
        assert!(service.store().is_authenticated());
        assert!(storage.contains_key(keys::USER));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_accepts_any_non_blank_username() {
        let (service, _storage) = service();

        let user = service
            .login(&Credentials::new("jo@shop", "pw"))
            .await
            .unwrap();
        assert_eq!(user.username, "jo@shop");
        assert_eq!(user.email, "jo@shop@example.com");
        assert!(service.store().is_authenticated());

        let long = "a".repeat(250);
        let user = service.login(&Credentials::new(&long, "pw")).await.unwrap();
        assert_eq!(user.username, long);
        assert!(service.store().is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_is_loading_during_delay() {
        let (service, _storage) = service();
        let credentials = Credentials::new("jo", "");
        let store = service.store().clone();

        let (result, midway) = tokio::join!(service.login(&credentials), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            store.state()
        });

        assert!(midway.is_loading());
        assert!(result.is_ok());
        assert!(store.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_username_fails() {
        let (service, storage) = service();
        let err = service
            .login(&Credentials::new("   ", "secret"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::EmptyUsername));
        assert_eq!(
            service.store().state(),
            AuthState::Failed("username is required".to_string())
        );
        assert!(!storage.contains_key(keys::USER));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_user() {
        let (service, storage) = service();
        service.login(&Credentials::new("jo", "pw")).await.unwrap();

        service.logout().unwrap();
        assert_eq!(service.store().state(), AuthState::Anonymous);
        assert!(storage.get(keys::USER).unwrap().is_none());
    }

    #[test]
    fn test_register_validation() {
        let (service, _storage) = service();

        let email = service
            .register(&registration("jo@example.com", "pw", "pw"))
            .unwrap();
        assert_eq!(email.as_str(), "jo@example.com");

        assert!(matches!(
            service.register(&registration("jo@example.com", "pw", "wp")),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(matches!(
            service.register(&registration("not-an-email", "pw", "pw")),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            service.register(&registration("jo@example.com", "", "")),
            Err(AuthError::EmptyPassword)
        ));
    }

    #[test]
    fn test_register_persists_nothing() {
        let (service, storage) = service();
        service
            .register(&registration("jo@example.com", "pw", "pw"))
            .unwrap();
        assert!(!storage.contains_key(keys::USER));
        assert!(!service.store().is_authenticated());
    }
}
