//! Product catalog API client.
//!
//! # Architecture
//!
//! - Read-only JSON API: `GET /products`, `GET /products/{id}`,
//!   `GET /products/categories`
//! - The catalog is the source of truth; every call goes to the network
//! - No retries; the only timeout is the optional `BAZAAR_HTTP_TIMEOUT_SECS`
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config)?;
//! let products = client.list_products().await?;
//! let product = client.get_product(ProductId::new(1)).await?;
//! ```

mod client;

pub use client::CatalogClient;

use bazaar_core::ProductId;
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("Catalog returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested product does not exist.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Endpoint URL could not be built from the base URL.
    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}
