//! Catalog and cart records.
//!
//! Field names follow the remote catalog's JSON so the same types decode API
//! responses and round-trip through durable storage.

use core::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Price, ProductId};

/// Aggregate customer rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rating {
    /// Average score.
    pub rate: f64,
    /// Number of ratings.
    pub count: u32,
}

/// A catalog product.
///
/// Immutable once fetched; views share it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    pub category: String,
    /// Image URL as served by the catalog.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

/// A product in the cart together with its quantity.
///
/// Serialized flat: every product field plus `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: NonZeroU32,
}

impl CartLine {
    /// Create a line for `quantity` units of `product`.
    #[must_use]
    pub const fn new(product: Product, quantity: NonZeroU32) -> Self {
        Self { product, quantity }
    }

    /// The product id this line is keyed by.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.times(self.quantity.get())
    }
}

/// A saved product on the wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WishlistEntry {
    pub product: Product,
}

impl WishlistEntry {
    /// The product id this entry is keyed by.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }
}

impl From<Product> for WishlistEntry {
    fn from(product: Product) -> Self {
        Self { product }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const API_PRODUCT: &str = r#"{
        "id": 1,
        "title": "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops",
        "price": 109.95,
        "description": "Your perfect pack for everyday use",
        "category": "men's clothing",
        "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
        "rating": { "rate": 3.9, "count": 120 }
    }"#;

    #[test]
    fn test_decode_api_product() {
        let product: Product = serde_json::from_str(API_PRODUCT).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price.amount(), Decimal::new(10995, 2));
        assert_eq!(product.category, "men's clothing");
        assert_eq!(product.rating.count, 120);
    }

    #[test]
    fn test_decode_without_rating() {
        let product: Product = serde_json::from_str(
            r#"{"id": 2, "title": "Mug", "price": 4, "category": "home"}"#,
        )
        .unwrap();
        assert_eq!(product.rating, Rating::default());
        assert!(product.image.is_empty());
    }

    #[test]
    fn test_cart_line_is_flat() {
        let product: Product = serde_json::from_str(API_PRODUCT).unwrap();
        let line = CartLine::new(product, NonZeroU32::new(2).unwrap());

        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["quantity"], 2);
        assert!(value.get("product").is_none());

        let back: CartLine = serde_json::from_value(value).unwrap();
        assert_eq!(back, line);
        assert_eq!(back.line_total(), Decimal::new(21990, 2));
    }

    #[test]
    fn test_cart_line_rejects_zero_quantity() {
        let mut value: serde_json::Value = serde_json::from_str(API_PRODUCT).unwrap();
        value["quantity"] = serde_json::json!(0);
        assert!(serde_json::from_value::<CartLine>(value).is_err());
    }

    #[test]
    fn test_wishlist_entry_is_transparent() {
        let product: Product = serde_json::from_str(API_PRODUCT).unwrap();
        let entry = WishlistEntry::from(product);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["title"], entry.product.title.as_str());
        assert_eq!(entry.id(), ProductId::new(1));
    }
}
