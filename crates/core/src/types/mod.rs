//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{CartLine, Product, Rating, WishlistEntry};
