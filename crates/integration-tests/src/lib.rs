//! Integration tests for Bazaar.
//!
//! The tests run the storefront against [`MockCatalog`], an in-process
//! HTTP server that speaks the catalog API, and persist state to a
//! temporary directory so "restarting" is just building a new `AppState`
//! over the same directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;

use bazaar_storefront::config::{StorefrontConfig, normalize_base_url};
use bazaar_storefront::state::AppState;

/// How the mock answers a request for an unknown product id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingProduct {
    /// `404 Not Found`.
    NotFound,
    /// `200 OK` with an empty body, as the public fakestore API does.
    EmptyBody,
}

/// Configurable in-process catalog API.
#[derive(Debug, Clone)]
pub struct MockCatalog {
    products: Vec<Value>,
    fail_products: bool,
    fail_categories: bool,
    missing: MissingProduct,
}

impl MockCatalog {
    #[must_use]
    pub const fn new(products: Vec<Value>) -> Self {
        Self {
            products,
            fail_products: false,
            fail_categories: false,
            missing: MissingProduct::NotFound,
        }
    }

    /// Answer `GET /products` with a 500.
    #[must_use]
    pub const fn failing_products(mut self) -> Self {
        self.fail_products = true;
        self
    }

    /// Answer `GET /products/categories` with a 500.
    #[must_use]
    pub const fn failing_categories(mut self) -> Self {
        self.fail_categories = true;
        self
    }

    #[must_use]
    pub const fn missing_product(mut self, missing: MissingProduct) -> Self {
        self.missing = missing;
        self
    }

    /// Bind to an ephemeral local port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(self) -> MockServer {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock catalog");
        let addr = listener.local_addr().expect("mock catalog address");

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/categories", get(list_categories))
            .route("/products/{id}", get(get_product))
            .with_state(Arc::new(self));

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = normalize_base_url(&format!("http://{addr}")).expect("mock catalog url");
        MockServer { base_url, handle }
    }
}

async fn list_products(State(catalog): State<Arc<MockCatalog>>) -> Response {
    if catalog.fail_products {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    axum::Json(catalog.products.clone()).into_response()
}

async fn list_categories(State(catalog): State<Arc<MockCatalog>>) -> Response {
    if catalog.fail_categories {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let categories: Vec<Value> = catalog
        .products
        .iter()
        .filter_map(|product| product.get("category").cloned())
        .collect();
    axum::Json(categories).into_response()
}

async fn get_product(
    State(catalog): State<Arc<MockCatalog>>,
    Path(id): Path<String>,
) -> Response {
    let found = id.parse::<i64>().ok().and_then(|id| {
        catalog
            .products
            .iter()
            .find(|product| product.get("id").and_then(Value::as_i64) == Some(id))
    });
    match (found, catalog.missing) {
        (Some(product), _) => axum::Json(product.clone()).into_response(),
        (None, MissingProduct::NotFound) => StatusCode::NOT_FOUND.into_response(),
        (None, MissingProduct::EmptyBody) => StatusCode::OK.into_response(),
    }
}

/// A running [`MockCatalog`]. Stops serving when dropped.
#[derive(Debug)]
pub struct MockServer {
    base_url: Url,
    handle: JoinHandle<()>,
}

impl MockServer {
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A product record shaped like the catalog's JSON.
#[must_use]
pub fn product_json(id: i32, title: &str, price: f64, category: &str, rate: f64) -> Value {
    json!({
        "id": id,
        "title": title,
        "price": price,
        "description": format!("Description of {title}"),
        "category": category,
        "image": format!("https://img.example/{id}.jpg"),
        "rating": { "rate": rate, "count": 100 + id }
    })
}

/// A small catalog across three categories.
#[must_use]
pub fn sample_products() -> Vec<Value> {
    vec![
        product_json(1, "Fjallraven Backpack", 109.95, "men's clothing", 3.9),
        product_json(2, "Mens Casual T-Shirt", 22.3, "men's clothing", 4.1),
        product_json(3, "Mens Cotton Jacket", 55.99, "men's clothing", 4.7),
        product_json(4, "Gold Chain Bracelet", 695.0, "jewelery", 4.6),
        product_json(5, "Silver Dragon Ring", 168.0, "jewelery", 3.9),
        product_json(6, "Portable External Drive", 64.0, "electronics", 3.3),
        product_json(7, "Gaming Monitor", 999.99, "electronics", 2.2),
        product_json(8, "Solid State Drive", 109.0, "electronics", 4.8),
        product_json(9, "Rain Jacket Women", 39.99, "women's clothing", 3.8),
        product_json(10, "Short Sleeve Tee", 9.85, "women's clothing", 4.7),
    ]
}

/// A mock catalog plus a durable data directory.
pub struct TestContext {
    pub server: MockServer,
    pub data_dir: TempDir,
}

impl TestContext {
    /// Serve `catalog` and create an empty data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub async fn new(catalog: MockCatalog) -> Self {
        let data_dir = TempDir::new().expect("create data dir");
        Self {
            server: catalog.spawn().await,
            data_dir,
        }
    }

    /// Configuration pointing at the mock catalog and the data directory.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let mut config =
            StorefrontConfig::new(self.server.base_url().clone(), self.data_dir.path());
        config.login_delay = Duration::from_millis(10);
        config.http_timeout = Some(Duration::from_secs(5));
        config
    }

    /// Build a fresh `AppState`, rehydrating whatever was persisted.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be created.
    #[must_use]
    pub fn state(&self) -> AppState {
        AppState::new(self.config()).expect("create app state")
    }
}
