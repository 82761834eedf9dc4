//! Write-through state containers.
//!
//! Every mutation completes its durable write before returning, so a
//! subsequent read (in this process or after a restart) observes it.
//!
//! - [`CartStore`] - line items keyed by product id, quantities accumulate
//! - [`WishlistStore`] - saved products, set semantics
//! - [`AuthStore`] - authentication state and the persisted user

mod auth;
mod cart;
mod collection;
mod wishlist;

pub use auth::AuthStore;
pub use cart::CartStore;
pub use collection::PersistedCollection;
pub use wishlist::WishlistStore;
