//! Business logic services for the storefront.
//!
//! - `auth` - Sign in, sign out and registration

pub mod auth;
