//! Domain models for the storefront.
//!
//! - [`user`] - Signed-in user record, login credentials, registration form
//! - [`auth`] - Authentication state machine

pub mod auth;
pub mod user;

pub use auth::AuthState;
pub use user::{Credentials, Registration, User};
