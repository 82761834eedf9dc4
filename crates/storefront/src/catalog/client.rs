//! `reqwest` client for the catalog API.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use bazaar_core::{Product, ProductId};

use super::CatalogError;
use crate::config::StorefrontConfig;

/// Longest body excerpt written to logs.
const LOG_BODY_CHARS: usize = 500;

/// Client for the remote product catalog.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

/// Outcome of a GET that reached the catalog.
enum Fetched<T> {
    Found(T),
    /// Success status with an empty or `null` body.
    Empty,
    /// Non-success status.
    Status(u16, Url),
}

impl CatalogClient {
    /// Create a client for the configured catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &StorefrontConfig) -> Result<Self, CatalogError> {
        Self::with_base_url(config.catalog_url.clone(), config.http_timeout)
    }

    /// Create a client for `base_url` (which should end in `/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_base_url(base_url: Url, timeout: Option<Duration>) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("bazaar/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client: builder.build()?,
                base_url,
            }),
        })
    }

    /// The catalog base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// GET `path` relative to the base URL and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Fetched<T>, CatalogError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(status = %status, url = %url, "Catalog returned non-success status");
            return Ok(Fetched::Status(status.as_u16(), url));
        }

        let body = response.text().await?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            debug!(url = %url, "Catalog returned an empty body");
            return Ok(Fetched::Empty);
        }

        match serde_json::from_str(trimmed) {
            Ok(value) => Ok(Fetched::Found(value)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %trimmed.chars().take(LOG_BODY_CHARS).collect::<String>(),
                    "Failed to parse catalog response"
                );
                Err(CatalogError::Parse(e))
            }
        }
    }

    /// Fetch every product, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success,
    /// or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        match self.get_json::<Vec<Product>>("products").await? {
            Fetched::Found(products) => {
                debug!(count = products.len(), "Fetched products");
                Ok(products)
            }
            Fetched::Empty => Ok(Vec::new()),
            Fetched::Status(status, url) => Err(CatalogError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the catalog answers with a
    /// non-success status or no product; other errors as for
    /// [`list_products`](Self::list_products).
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        match self.get_json::<Product>(&format!("products/{id}")).await? {
            Fetched::Found(product) => Ok(product),
            Fetched::Empty | Fetched::Status(..) => Err(CatalogError::NotFound(id)),
        }
    }

    /// Fetch the category names, first occurrence order, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success,
    /// or the body is not a list of strings.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        match self.get_json::<Vec<String>>("products/categories").await? {
            Fetched::Found(categories) => Ok(dedup_preserving_order(categories)),
            Fetched::Empty => Ok(Vec::new()),
            Fetched::Status(status, url) => Err(CatalogError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
