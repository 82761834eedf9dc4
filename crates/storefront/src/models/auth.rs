//! Authentication state.

use super::user::User;

/// Where the login flow currently stands.
///
/// "Authenticated" and "has a user" are the same variant, so they cannot
/// disagree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No user signed in.
    #[default]
    Anonymous,
    /// A login request is in flight.
    LoggingIn,
    /// A user is signed in.
    Authenticated(User),
    /// The last login attempt failed; no user is signed in.
    Failed(String),
}

impl AuthState {
    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::LoggingIn)
    }

    /// Message from the last failed login.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
