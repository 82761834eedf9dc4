//! Bazaar storefront library.
//!
//! Everything a storefront front end needs short of rendering: the catalog
//! client, the persisted cart, wishlist and session, the product listing
//! pipeline and the shared [`state::AppState`] that ties them together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod listing;
pub mod models;
pub mod products;
pub mod services;
pub mod state;
pub mod storage;
pub mod stores;
