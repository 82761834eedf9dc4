//! Unified error handling with Sentry integration.
//!
//! Every storefront operation that can fail for more than one reason returns
//! `Result<T, AppError>`. Front ends call [`AppError::report`] before showing
//! [`AppError::user_message`] so faults on our side reach Sentry while user
//! mistakes do not.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the fault lies with us or an upstream service rather than
    /// with the user's input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Catalog(err) => !matches!(err, CatalogError::NotFound(_)),
            Self::Auth(err) => matches!(err, AuthError::Storage(_)),
            Self::Storage(_) | Self::Config(_) | Self::Internal(_) => true,
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }

    /// Send server errors to Sentry and the log.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::NotFound(id)) => format!("Product {id} not found"),
            Self::Catalog(_) => "The product catalog is unavailable, please try again".to_string(),
            Self::Storage(_) => "Could not save your changes".to_string(),
            Self::Config(err) => err.to_string(),
            Self::Auth(err) => match err {
                AuthError::Storage(_) => "Could not save your session".to_string(),
                other => other.to_string(),
            },
            Self::Internal(_) => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a user action.
///
/// ```rust,ignore
/// add_breadcrumb("wishlist", "Toggled wishlist", Some(&[("product_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
