//! Shopping cart.

use std::num::NonZeroU32;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::instrument;

use bazaar_core::{CartLine, Product, ProductId};

use super::PersistedCollection;
use crate::storage::{Storage, StorageError, keys};

/// Cart line items in insertion order, at most one line per product.
pub struct CartStore {
    lines: PersistedCollection<CartLine>,
}

impl CartStore {
    /// Rehydrate the cart from durable storage.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        Self {
            lines: PersistedCollection::load(storage, keys::CART),
        }
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same product has its quantity increased;
    /// otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&self, product: &Product, quantity: NonZeroU32) -> Result<(), StorageError> {
        self.lines.update(|lines| {
            match lines.iter_mut().find(|line| line.id() == product.id) {
                Some(line) => line.quantity = line.quantity.saturating_add(quantity.get()),
                None => lines.push(CartLine::new(product.clone(), quantity)),
            }
            true
        })?;
        crate::error::add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product.id.to_string().as_str())]),
        );
        Ok(())
    }

    /// Drop the line for `id`. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn remove(&self, id: ProductId) -> Result<bool, StorageError> {
        self.lines.update(|lines| {
            let before = lines.len();
            lines.retain(|line| line.id() != id);
            lines.len() != before
        })
    }

    /// Set the quantity of the line for `id`. Returns whether a line matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn set_quantity(&self, id: ProductId, quantity: NonZeroU32) -> Result<bool, StorageError> {
        self.lines.update(|lines| {
            let Some(line) = lines.iter_mut().find(|line| line.id() == id) else {
                return false;
            };
            line.quantity = quantity;
            true
        })
    }

    /// Empty the cart and delete its durable key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be deleted.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), StorageError> {
        self.lines.clear()
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .read(|lines| lines.iter().map(CartLine::line_total).sum())
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.read(|lines| {
            lines
                .iter()
                .fold(0_u32, |count, line| count.saturating_add(line.quantity.get()))
        })
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<CartLine> {
        self.lines
            .read(|lines| lines.iter().find(|line| line.id() == id).cloned())
    }

    /// Copy of all lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.snapshot()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.read(<[CartLine]>::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
