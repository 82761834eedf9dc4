//! Application state shared by every front end.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use url::Url;

use bazaar_core::{CartLine, Product, ProductId, WishlistEntry};

use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{Credentials, Registration, User};
use crate::products::ProductsState;
use crate::services::auth::{AuthService, SimulatedAuthenticator};
use crate::storage::{FileStorage, Storage};
use crate::stores::{AuthStore, CartStore, WishlistStore};

/// Application state.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog client, the persisted stores and the product list state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: CartStore,
    wishlist: WishlistStore,
    auth: AuthService,
    products: Mutex<ProductsState>,
}

/// What the checkout page shows.
#[derive(Debug, Clone)]
pub struct CheckoutSummary {
    pub user: User,
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub item_count: u32,
}

impl AppState {
    /// Create the application state with file-backed storage under
    /// `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the
    /// HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let storage = FileStorage::open(&config.data_dir)?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Create the application state over an existing storage backend.
    ///
    /// The cart, wishlist and signed-in user are rehydrated from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(config: StorefrontConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        let catalog = CatalogClient::new(&config)?;
        let cart = CartStore::load(Arc::clone(&storage));
        let wishlist = WishlistStore::load(Arc::clone(&storage));
        let auth_store = Arc::new(AuthStore::load(storage));
        let auth = AuthService::new(auth_store, SimulatedAuthenticator::new(config.login_delay));
        let products = Mutex::new(ProductsState::new(config.page_size));

        info!(
            catalog_url = %config.catalog_url,
            cart_lines = cart.len(),
            wishlist_entries = wishlist.len(),
            signed_in = auth.store().is_authenticated(),
            "Storefront state loaded"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
                wishlist,
                auth,
                products,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        self.inner.auth.store()
    }

    /// Lock the product list state.
    pub fn products(&self) -> MutexGuard<'_, ProductsState> {
        self.inner
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch products and categories concurrently into their own slots.
    ///
    /// Failures are recorded on the slots, not returned; one fetch failing
    /// does not affect the other.
    #[instrument(skip(self))]
    pub async fn refresh_catalog(&self) {
        let (products_ticket, categories_ticket) = {
            let mut products = self.products();
            (
                products.begin_products_fetch(),
                products.begin_categories_fetch(),
            )
        };

        let catalog = self.catalog();
        let (items, categories) =
            tokio::join!(catalog.list_products(), catalog.list_categories());

        let mut products = self.products();
        products.finish_products_fetch(products_ticket, items);
        products.finish_categories_fetch(categories_ticket, categories);
    }

    /// Shareable storefront link for a search, or `None` for a blank query.
    #[must_use]
    pub fn search_link(&self, query: &str) -> Option<Url> {
        crate::listing::search_url(&self.config().storefront_url, query)
    }

    /// Stop accepting catalog results. Fetches still in flight are ignored
    /// when they land.
    pub fn close(&self) {
        self.products().detach();
        debug!("Storefront state closed");
    }

    /// Fetch one product for its detail page.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown id, or the
    /// transport error.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        let product = self.catalog().get_product(id).await?;
        add_breadcrumb(
            "navigation",
            "Viewed product page",
            Some(&[("product_id", id.to_string().as_str())]),
        );
        Ok(product)
    }

    /// Fetch `id` and add `quantity` units of it to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be fetched or the cart
    /// cannot be saved.
    pub async fn add_to_cart(&self, id: ProductId, quantity: NonZeroU32) -> Result<Product> {
        let product = self.product(id).await?;
        self.cart().add(&product, quantity)?;
        Ok(product)
    }

    /// Fetch `id` and flip its wishlist membership. Returns whether it is
    /// now saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be fetched or the wishlist
    /// cannot be saved.
    pub async fn toggle_wishlist(&self, id: ProductId) -> Result<bool> {
        let product = self.product(id).await?;
        Ok(self.wishlist().toggle(&product)?)
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// Returns the login failure; the auth store holds it as well.
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        Ok(self.inner.auth.login(credentials).await?)
    }

    /// Sign out locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored user cannot be deleted.
    pub fn logout(&self) -> Result<()> {
        Ok(self.inner.auth.logout()?)
    }

    /// Validate a registration form.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn register(&self, registration: &Registration) -> Result<()> {
        self.inner.auth.register(registration)?;
        Ok(())
    }

    /// Gate for private pages: the signed-in user, or `Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when nobody is signed in.
    pub fn require_user(&self) -> Result<User> {
        self.auth()
            .user()
            .ok_or_else(|| AppError::Unauthorized("sign in to continue".to_string()))
    }

    /// The wishlist page. Requires a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when nobody is signed in.
    pub fn wishlist_page(&self) -> Result<Vec<WishlistEntry>> {
        self.require_user()?;
        Ok(self.wishlist().entries())
    }

    /// The checkout page. Requires a signed-in user and a non-empty cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when nobody is signed in, or
    /// `AppError::BadRequest` when the cart is empty.
    pub fn checkout_summary(&self) -> Result<CheckoutSummary> {
        let user = self.require_user()?;
        let cart = self.cart();
        let lines = cart.lines();
        if lines.is_empty() {
            return Err(AppError::BadRequest("your cart is empty".to_string()));
        }
        let total = lines.iter().map(CartLine::line_total).sum();
        let item_count = lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity.get()));
        Ok(CheckoutSummary {
            user,
            lines,
            total,
            item_count,
        })
    }
}
