//! Catalog browsing commands.

use rust_decimal::Decimal;
use url::Url;

use bazaar_core::ProductId;
use bazaar_storefront::error::AppError;
use bazaar_storefront::listing::{FilterPatch, SortBy};
use bazaar_storefront::state::AppState;

use crate::{CliError, output};

/// Listing controls from the command line.
pub struct ListingQuery {
    pub category: Option<String>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub sort: Option<String>,
    pub search: Option<String>,
    /// Listing link whose `search` parameter seeds the search
    pub url: Option<Url>,
    pub page: usize,
}

impl ListingQuery {
    fn patch(&mut self) -> FilterPatch {
        FilterPatch {
            category: self.category.take().map(Some),
            min_price: self.min,
            max_price: self.max,
            sort_by: self.sort.as_deref().map(SortBy::from_key),
        }
    }
}

/// List one page of products.
pub async fn products(state: &AppState, mut query: ListingQuery) -> Result<(), CliError> {
    state.refresh_catalog().await;

    let mut products = state.products();
    if let Some(message) = &products.products_fetch().error {
        return Err(CliError::Fetch(format!("Could not load products: {message}")));
    }

    let patch = query.patch();
    if !patch.is_empty() {
        products.set_filters(patch);
    }
    if let Some(url) = &query.url {
        products.apply_url(url);
    }
    if let Some(search) = query.search.take() {
        products.set_search(search);
    }
    products.set_page(query.page);

    output::page(&products.current_view());
    if let Some(link) = state.search_link(products.search()) {
        output::line(&format!("Link: {link}"));
    }
    Ok(())
}

/// Show one product.
pub async fn product(state: &AppState, id: ProductId) -> Result<(), CliError> {
    let product = state.product(id).await?;
    output::product(&product);
    Ok(())
}

/// List categories.
pub async fn categories(state: &AppState) -> Result<(), CliError> {
    let categories = state
        .catalog()
        .list_categories()
        .await
        .map_err(AppError::from)?;
    output::categories(&categories);
    Ok(())
}
