//! Private pages require a signed-in user.

#![allow(clippy::unwrap_used)]

use std::num::NonZeroU32;

use bazaar_core::ProductId;
use bazaar_integration_tests::{MockCatalog, TestContext, sample_products};
use bazaar_storefront::error::AppError;
use bazaar_storefront::models::Credentials;
use bazaar_storefront::services::auth::AuthError;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_wishlist_page_requires_sign_in() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let state = ctx.state();
    state.toggle_wishlist(ProductId::new(1)).await.unwrap();

    assert!(matches!(state.wishlist_page(), Err(AppError::Unauthorized(_))));

    state.login(&Credentials::new("jo", "pw")).await.unwrap();
    assert_eq!(state.wishlist_page().unwrap().len(), 1);

    state.logout().unwrap();
    assert!(matches!(state.wishlist_page(), Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn test_checkout_flow() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let state = ctx.state();
    state
        .add_to_cart(ProductId::new(4), NonZeroU32::new(2).unwrap())
        .await
        .unwrap();

    let err = state.checkout_summary().unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(!err.is_server_error());

    state.login(&Credentials::new("jo", "pw")).await.unwrap();
    let summary = state.checkout_summary().unwrap();
    assert_eq!(summary.user.username, "jo");
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.total, Decimal::from(1390));
}

#[tokio::test]
async fn test_failed_login_keeps_user_out() {
    let ctx = TestContext::new(MockCatalog::new(sample_products())).await;
    let state = ctx.state();

    let err = state.login(&Credentials::new("", "pw")).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::EmptyUsername)));
    assert_eq!(state.auth().state().error(), Some("username is required"));
    assert!(matches!(state.require_user(), Err(AppError::Unauthorized(_))));
    assert!(!ctx.data_dir.path().join("user.json").exists());
}
