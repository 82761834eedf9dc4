//! Cart commands.

use std::num::NonZeroU32;

use bazaar_core::ProductId;
use bazaar_storefront::error::AppError;
use bazaar_storefront::state::AppState;

use crate::{CliError, output};

pub fn show(state: &AppState) {
    let cart = state.cart();
    output::cart(&cart.lines(), cart.total());
}

pub async fn add(state: &AppState, id: ProductId, quantity: NonZeroU32) -> Result<(), CliError> {
    let product = state.add_to_cart(id, quantity).await?;
    output::line(&format!("Added {quantity} x {} to your cart.", product.title));
    Ok(())
}

pub fn remove(state: &AppState, id: ProductId) -> Result<(), CliError> {
    if state.cart().remove(id).map_err(AppError::from)? {
        output::line(&format!("Removed product {id} from your cart."));
    } else {
        output::line(&format!("Product {id} is not in your cart."));
    }
    Ok(())
}

pub fn set(state: &AppState, id: ProductId, quantity: NonZeroU32) -> Result<(), CliError> {
    if !state
        .cart()
        .set_quantity(id, quantity)
        .map_err(AppError::from)?
    {
        return Err(AppError::NotFound(format!("product {id} in your cart")).into());
    }
    output::line(&format!("Set product {id} to {quantity}."));
    Ok(())
}

pub fn clear(state: &AppState) -> Result<(), CliError> {
    state.cart().clear().map_err(AppError::from)?;
    output::line("Cart cleared.");
    Ok(())
}
