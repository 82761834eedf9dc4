//! Caller-side product list state.
//!
//! Holds the fetched catalog next to the listing controls. Fetch results are
//! delivered through tickets so a response for a superseded request (or one
//! that lands after the owner went away) never overwrites newer state.

use std::fmt::Display;
use std::num::NonZeroUsize;

use tracing::{debug, warn};
use url::Url;

use bazaar_core::Product;

use crate::listing::{self, FilterPatch, FilterState, ProductPage};

/// Identifies one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Loading and error indicators for one kind of fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchSlot {
    pub loading: bool,
    pub error: Option<String>,
    current: Option<FetchTicket>,
}

impl FetchSlot {
    fn begin(&mut self, ticket: FetchTicket) {
        self.loading = true;
        self.error = None;
        self.current = Some(ticket);
    }

    /// Close the slot if `ticket` is the live one.
    fn finish(&mut self, ticket: FetchTicket) -> bool {
        if self.current != Some(ticket) {
            return false;
        }
        self.current = None;
        self.loading = false;
        true
    }
}

/// Products, categories and the listing controls.
#[derive(Debug, Clone)]
pub struct ProductsState {
    items: Vec<Product>,
    categories: Vec<String>,
    products_fetch: FetchSlot,
    categories_fetch: FetchSlot,
    next_ticket: u64,
    filters: FilterState,
    search: String,
    page: usize,
    page_size: NonZeroUsize,
}

impl ProductsState {
    #[must_use]
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            items: Vec::new(),
            categories: Vec::new(),
            products_fetch: FetchSlot::default(),
            categories_fetch: FetchSlot::default(),
            next_ticket: 0,
            filters: FilterState::default(),
            search: String::new(),
            page: 1,
            page_size,
        }
    }

    fn issue(&mut self) -> FetchTicket {
        self.next_ticket += 1;
        FetchTicket(self.next_ticket)
    }

    /// Start a product fetch; any earlier one is superseded.
    pub fn begin_products_fetch(&mut self) -> FetchTicket {
        let ticket = self.issue();
        self.products_fetch.begin(ticket);
        ticket
    }

    /// Deliver a product fetch result. Returns whether it was applied.
    ///
    /// On failure the list is emptied and the message recorded.
    pub fn finish_products_fetch<E: Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Product>, E>,
    ) -> bool {
        if !self.products_fetch.finish(ticket) {
            debug!(?ticket, "Ignoring stale product fetch");
            return false;
        }
        match result {
            Ok(items) => {
                debug!(count = items.len(), "Loaded products");
                self.items = items;
            }
            Err(e) => {
                warn!(error = %e, "Product fetch failed");
                self.items.clear();
                self.products_fetch.error = Some(e.to_string());
            }
        }
        true
    }

    /// Start a category fetch; any earlier one is superseded.
    pub fn begin_categories_fetch(&mut self) -> FetchTicket {
        let ticket = self.issue();
        self.categories_fetch.begin(ticket);
        ticket
    }

    /// Deliver a category fetch result. Returns whether it was applied.
    ///
    /// On failure the previous categories are kept.
    pub fn finish_categories_fetch<E: Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<String>, E>,
    ) -> bool {
        if !self.categories_fetch.finish(ticket) {
            debug!(?ticket, "Ignoring stale category fetch");
            return false;
        }
        match result {
            Ok(categories) => self.categories = categories,
            Err(e) => {
                warn!(error = %e, "Category fetch failed");
                self.categories_fetch.error = Some(e.to_string());
            }
        }
        true
    }

    /// Drop every outstanding ticket so late results are ignored.
    pub fn detach(&mut self) {
        for slot in [&mut self.products_fetch, &mut self.categories_fetch] {
            slot.current = None;
            slot.loading = false;
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub const fn products_fetch(&self) -> &FetchSlot {
        &self.products_fetch
    }

    #[must_use]
    pub const fn categories_fetch(&self) -> &FetchSlot {
        &self.categories_fetch
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    pub fn set_filters(&mut self, patch: FilterPatch) {
        self.filters.apply(patch);
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Take the search term from a listing link (`?search=...`).
    pub fn apply_url(&mut self, url: &Url) {
        self.set_search(listing::search_from_url(url));
    }

    /// Jump to `page` (1-based; 0 is read as 1).
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// The page of products the current controls select.
    #[must_use]
    pub fn current_view(&self) -> ProductPage<'_> {
        listing::view(
            &self.items,
            &self.filters,
            &self.search,
            self.page,
            self.page_size,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{Price, ProductId, Rating};
    use rust_decimal::Decimal;

    use super::*;
    use crate::listing::SortBy;

    fn product(id: i32, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::new(Decimal::from(price)).unwrap(),
            description: String::new(),
            category: "misc".to_string(),
            image: String::new(),
            rating: Rating::default(),
        }
    }

    fn state() -> ProductsState {
        ProductsState::new(NonZeroUsize::new(9).unwrap())
    }

    #[test]
    fn test_fetch_lifecycle() {
        let mut state = state();
        let ticket = state.begin_products_fetch();
        assert!(state.products_fetch().loading);

        assert!(state.finish_products_fetch::<String>(ticket, Ok(vec![product(1, 10)])));
        assert!(!state.products_fetch().loading);
        assert_eq!(state.items().len(), 1);
        assert!(state.products_fetch().error.is_none());
    }

    #[test]
    fn test_failed_fetch_clears_items() {
        let mut state = state();
        let ticket = state.begin_products_fetch();
        state.finish_products_fetch::<String>(ticket, Ok(vec![product(1, 10)]));

        let ticket = state.begin_products_fetch();
        assert!(state.finish_products_fetch(ticket, Err("connection refused")));
        assert!(state.items().is_empty());
        assert_eq!(
            state.products_fetch().error.as_deref(),
            Some("connection refused")
        );

        state.begin_products_fetch();
        assert!(state.products_fetch().error.is_none());
    }

    #[test]
    fn test_superseded_ticket_is_ignored() {
        let mut state = state();
        let old = state.begin_products_fetch();
        let new = state.begin_products_fetch();

        assert!(!state.finish_products_fetch::<String>(old, Ok(vec![product(1, 10)])));
        assert!(state.items().is_empty());
        assert!(state.products_fetch().loading);

        assert!(state.finish_products_fetch::<String>(new, Ok(vec![product(2, 20)])));
        assert_eq!(state.items()[0].id, ProductId::new(2));
    }

    #[test]
    fn test_apply_url_sets_search() {
        let mut state = state();
        state.set_page(3);
        state.apply_url(&Url::parse("http://localhost:3000/?search=gold%20ring").unwrap());
        assert_eq!(state.search(), "gold ring");
        assert_eq!(state.page(), 1);

        state.apply_url(&Url::parse("http://localhost:3000/").unwrap());
        assert_eq!(state.search(), "");
    }

    #[test]
    fn test_detached_results_are_ignored() {
        let mut state = state();
        let products = state.begin_products_fetch();
        let categories = state.begin_categories_fetch();
        state.detach();

        assert!(!state.finish_products_fetch::<String>(products, Ok(vec![product(1, 10)])));
        assert!(!state.finish_categories_fetch::<String>(categories, Ok(vec!["a".into()])));
        assert!(state.items().is_empty());
        assert!(state.categories().is_empty());
    }

    #[test]
    fn test_slots_are_independent() {
        let mut state = state();
        let products = state.begin_products_fetch();
        let categories = state.begin_categories_fetch();

        state.finish_categories_fetch(categories, Err("HTTP 500"));
        assert!(state.products_fetch().loading);
        assert!(state.products_fetch().error.is_none());

        state.finish_products_fetch::<String>(products, Ok(vec![product(1, 10)]));
        assert_eq!(state.categories_fetch().error.as_deref(), Some("HTTP 500"));
        assert_eq!(state.items().len(), 1);
    }

    #[test]
    fn test_controls_reset_page() {
        let mut state = state();
        state.set_page(3);
        state.set_filters(FilterPatch {
            sort_by: Some(SortBy::PriceDesc),
            ..FilterPatch::default()
        });
        assert_eq!(state.page(), 1);

        state.set_page(2);
        state.set_search("jacket");
        assert_eq!(state.page(), 1);

        state.set_page(2);
        state.clear_filters();
        assert_eq!(state.page(), 1);
        assert_eq!(state.filters(), &FilterState::default());
        assert_eq!(state.search(), "jacket");
    }

    #[test]
    fn test_current_view() {
        let mut state = state();
        let ticket = state.begin_products_fetch();
        let items = (1..=10).map(|i| product(i, i64::from(i))).collect();
        state.finish_products_fetch::<String>(ticket, Ok(items));

        assert_eq!(state.current_view().items.len(), 9);
        state.set_page(2);
        let view = state.current_view();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.total_pages, 2);
    }
}
