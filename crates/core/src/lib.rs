//! Bazaar Core - Shared types library.
//!
//! This crate provides the types used across all Bazaar components:
//! - `storefront` - Catalog client, durable cart/wishlist/auth state, listing pipeline
//! - `cli` - Command-line storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, and the catalog/cart records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
