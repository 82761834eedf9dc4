//! Catalog client and product list state against the mock catalog.

#![allow(clippy::unwrap_used)]

use bazaar_core::ProductId;
use bazaar_integration_tests::{MissingProduct, MockCatalog, TestContext, sample_products};
use bazaar_storefront::catalog::{CatalogClient, CatalogError};
use bazaar_storefront::error::AppError;
use bazaar_storefront::listing::{FilterPatch, SortBy};
use bazaar_storefront::state::AppState;
use rust_decimal::Decimal;
use url::Url;

// =============================================================================
// Client
// =============================================================================

#[tokio::test]
async fn test_list_products_decodes_catalog() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let client = CatalogClient::new(&ctx.config()).unwrap();

    let products = client.list_products().await.unwrap();
    assert_eq!(products.len(), 10);
    assert_eq!(products[0].title, "Fjallraven Backpack");
    assert_eq!(products[0].price.amount(), Decimal::new(10995, 2));
    assert!((products[0].rating.rate - 3.9).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_get_product() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let client = CatalogClient::new(&ctx.config()).unwrap();

    let product = client.get_product(ProductId::new(4)).await.unwrap();
    assert_eq!(product.title, "Gold Chain Bracelet");
    assert_eq!(product.category, "jewelery");
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    for missing in [MissingProduct::NotFound, MissingProduct::EmptyBody] {
        let catalog = MockCatalog::new(sample_products()).missing_product(missing);
        let ctx = TestContext::new(catalog).await;
        let client = CatalogClient::new(&ctx.config()).unwrap();

        let err = client.get_product(ProductId::new(999)).await.unwrap_err();
        assert!(
            matches!(err, CatalogError::NotFound(id) if id == ProductId::new(999)),
            "{missing:?}: {err}"
        );
    }
}

#[tokio::test]
async fn test_categories_are_deduplicated_in_order() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let client = CatalogClient::new(&ctx.config()).unwrap();

    let categories = client.list_categories().await.unwrap();
    assert_eq!(
        categories,
        vec!["men's clothing", "jewelery", "electronics", "women's clothing"]
    );
}

#[tokio::test]
async fn test_server_error_is_status() {
    let ctx = TestContext::new(MockCatalog::new(sample_products()).failing_products()).await;
    let client = CatalogClient::new(&ctx.config()).unwrap();

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(err, CatalogError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_product_lookup_through_state() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let state = ctx.state();

    assert_eq!(state.product(ProductId::new(3)).await.unwrap().title, "Mens Cotton Jacket");
    let err = state.product(ProductId::new(42)).await.unwrap_err();
    assert!(matches!(err, AppError::Catalog(CatalogError::NotFound(_))));
    assert!(!err.is_server_error());
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_loads_both_slots() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let state = ctx.state();
    state.refresh_catalog().await;

    let products = state.products();
    assert_eq!(products.items().len(), 10);
    assert_eq!(products.categories().len(), 4);
    assert!(!products.products_fetch().loading);
    assert!(products.products_fetch().error.is_none());
    assert!(products.categories_fetch().error.is_none());
}

#[tokio::test]
async fn test_category_failure_does_not_block_products() {
    let ctx = TestContext::new(MockCatalog::new(sample_products()).failing_categories()).await;
    let state = ctx.state();
    state.refresh_catalog().await;

    let products = state.products();
    assert_eq!(products.items().len(), 10);
    assert!(products.products_fetch().error.is_none());
    assert!(products.categories().is_empty());
    assert!(products.categories_fetch().error.is_some());
}

#[tokio::test]
async fn test_product_failure_empties_list() {
    let ctx = TestContext::new(MockCatalog::new(sample_products()).failing_products()).await;
    let state = ctx.state();
    state.refresh_catalog().await;

    let products = state.products();
    assert!(products.items().is_empty());
    assert!(products.products_fetch().error.is_some());
    assert_eq!(products.categories().len(), 4);
    assert_eq!(products.current_view().total_items, 0);
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_listing_over_fetched_catalog() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let state = ctx.state();
    state.refresh_catalog().await;

    let mut products = state.products();
    let first = products.current_view();
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), 9);
    assert_eq!(first.items[0].title, "Short Sleeve Tee");

    products.set_page(2);
    products.set_filters(FilterPatch {
        category: Some(Some("electronics".to_string())),
        sort_by: Some(SortBy::Rating),
        ..FilterPatch::default()
    });
    assert_eq!(products.page(), 1);
    let ids: Vec<i32> = products
        .current_view()
        .items
        .iter()
        .map(|p| p.id.as_i32())
        .collect();
    assert_eq!(ids, vec![8, 6, 7]);

    products.set_search("jacket");
    products.clear_filters();
    let titles: Vec<&str> = products
        .current_view()
        .items
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Rain Jacket Women", "Mens Cotton Jacket"]);
}

#[tokio::test]
async fn test_search_from_shared_link() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let mut config = ctx.config();
    config.storefront_url = Url::parse("https://shop.example/catalog/").unwrap();
    let state = AppState::new(config).unwrap();
    state.refresh_catalog().await;

    let link = state.search_link("JACKET").unwrap();
    assert_eq!(link.as_str(), "https://shop.example/?search=JACKET");

    let mut products = state.products();
    products.set_page(2);
    products.apply_url(&link);
    assert_eq!(products.search(), "JACKET");
    assert_eq!(products.page(), 1);
    let ids: Vec<i32> = products
        .current_view()
        .items
        .iter()
        .map(|p| p.id.as_i32())
        .collect();
    assert_eq!(ids, vec![9, 3]);
}

#[tokio::test]
async fn test_closed_state_ignores_refresh_results() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let state = ctx.state();
    state.refresh_catalog().await;
    assert_eq!(state.products().items().len(), 10);

    let ticket = state.products().begin_products_fetch();
    let fetched = state.catalog().list_products().await;
    state.close();

    let mut products = state.products();
    assert!(!products.finish_products_fetch(ticket, fetched));
    assert!(!products.products_fetch().loading);
    assert_eq!(products.items().len(), 10);
}
