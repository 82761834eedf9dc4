//! Wishlist commands.

use bazaar_core::ProductId;
use bazaar_storefront::error::AppError;
use bazaar_storefront::state::AppState;

use crate::{CliError, output};

/// Viewing the wishlist requires sign-in; editing it does not.
pub fn show(state: &AppState) -> Result<(), CliError> {
    let entries = state.wishlist_page()?;
    output::wishlist(&entries);
    Ok(())
}

pub async fn add(state: &AppState, id: ProductId) -> Result<(), CliError> {
    let product = state.product(id).await?;
    if state.wishlist().add(&product).map_err(AppError::from)? {
        output::line(&format!("Saved {}.", product.title));
    } else {
        output::line(&format!("{} is already saved.", product.title));
    }
    Ok(())
}

pub fn remove(state: &AppState, id: ProductId) -> Result<(), CliError> {
    if state.wishlist().remove(id).map_err(AppError::from)? {
        output::line(&format!("Removed product {id} from your wishlist."));
    } else {
        output::line(&format!("Product {id} is not in your wishlist."));
    }
    Ok(())
}

pub async fn toggle(state: &AppState, id: ProductId) -> Result<(), CliError> {
    let saved = state.toggle_wishlist(id).await?;
    let verb = if saved { "Saved" } else { "Unsaved" };
    output::line(&format!("{verb} product {id}."));
    Ok(())
}

pub fn clear(state: &AppState) -> Result<(), CliError> {
    state.wishlist().clear().map_err(AppError::from)?;
    output::line("Wishlist cleared.");
    Ok(())
}
