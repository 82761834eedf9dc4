//! Product listing pipeline: filter, sort, paginate.
//!
//! [`view`] is a pure function over the full product list. Keeping the
//! current page in step with the filters (back to page 1 whenever they
//! change) is the caller's job; see [`crate::products::ProductsState`].

use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroUsize;

use rust_decimal::Decimal;
use url::Url;

use bazaar_core::Product;

/// URL query parameter carrying the free-text search.
pub const SEARCH_PARAM: &str = "search";

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Cheapest first.
    #[default]
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Highest rated first.
    Rating,
    /// Catalog order.
    Unsorted,
}

impl SortBy {
    /// Parse a sort key. Unknown keys keep catalog order.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim() {
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            "rating" => Self::Rating,
            _ => Self::Unsorted,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Rating => "rating",
            Self::Unsorted => "none",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::Rating => b.rating.rate.total_cmp(&a.rating.rate),
            Self::Unsorted => Ordering::Equal,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::from(1000),
        }
    }
}

/// The active listing filters.
///
/// The default is no category, prices 0 to 1000, cheapest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    /// Exact, case-sensitive category; `None` matches every category.
    pub category: Option<String>,
    pub price_range: PriceRange,
    pub sort_by: SortBy,
}

/// A partial update to [`FilterState`]; `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    /// `Some(None)` (or an empty name) clears the category.
    pub category: Option<Option<String>>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<SortBy>,
}

impl FilterPatch {
    /// Whether applying this patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.sort_by.is_none()
    }
}

impl FilterState {
    /// Merge `patch` into the current filters.
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(category) = patch.category {
            self.category = category.filter(|name| !name.is_empty());
        }
        if let Some(min) = patch.min_price {
            self.price_range.min = min;
        }
        if let Some(max) = patch.max_price {
            self.price_range.max = max;
        }
        if let Some(sort_by) = patch.sort_by {
            self.sort_by = sort_by;
        }
    }

    /// Whether `product` passes every filter. `search` must be lowercase.
    fn matches(&self, product: &Product, search: &str) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| category == product.category)
            && self.price_range.contains(product.price.amount())
            && product.title.to_lowercase().contains(search)
    }
}

/// One page of the filtered, sorted listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage<'a> {
    pub items: Vec<&'a Product>,
    /// The 1-based page that was requested.
    pub page: usize,
    pub total_pages: usize,
    /// Products that passed the filters, across all pages.
    pub total_items: usize,
}

/// Filter, sort and paginate `products`.
///
/// `page` is 1-based; 0 is read as 1 and pages past the end are empty.
/// Ties keep catalog order.
#[must_use]
pub fn view<'a>(
    products: &'a [Product],
    filters: &FilterState,
    search: &str,
    page: usize,
    page_size: NonZeroUsize,
) -> ProductPage<'a> {
    let search = search.to_lowercase();
    let mut filtered: Vec<&Product> = products
        .iter()
        .filter(|product| filters.matches(product, &search))
        .collect();
    filtered.sort_by(|a, b| filters.sort_by.compare(a, b));

    let page = page.max(1);
    let size = page_size.get();
    let total_items = filtered.len();
    let items = filtered
        .into_iter()
        .skip((page - 1).saturating_mul(size))
        .take(size)
        .collect();

    ProductPage {
        items,
        page,
        total_pages: total_items.div_ceil(size),
        total_items,
    }
}

/// Read the search term from a storefront URL (`""` when absent).
#[must_use]
pub fn search_from_url(url: &Url) -> String {
    url.query_pairs()
        .find(|(name, _)| name == SEARCH_PARAM)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

/// Build the listing URL for a search, or `None` if the query is blank.
#[must_use]
pub fn search_url(base: &Url, query: &str) -> Option<Url> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let mut url = base.clone();
    url.set_path("/");
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut().append_pair(SEARCH_PARAM, query);
    Some(url)
}
