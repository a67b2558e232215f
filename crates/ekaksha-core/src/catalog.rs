//! # Catalog Filtering
//!
//! The storefront fetches a product list once per page view and narrows it
//! in memory as the shopper changes filters.
//!
//! ```text
//! listProducts() ──► Vec<Product> ──► CatalogFilter::apply ──► visible grid
//!                                        category == ?
//!                                        size ∈ sizes ?
//!                                        min ≤ offer_price ≤ max ?
//!                                        in stock ?
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Product, Size};

/// Shopper-selected catalog filters. Every unset field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CatalogFilter {
    /// Category name, compared case-insensitively.
    pub category: Option<String>,
    pub size: Option<Size>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub in_stock_only: bool,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Inclusive price range on the offer price.
    pub fn price_between(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn in_stock_only(mut self) -> Self {
        self.in_stock_only = true;
        self
    }

    /// Whether no filter is set.
    pub fn is_empty(&self) -> bool {
        *self == CatalogFilter::default()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category.as_deref() {
            // "All" is what the category dropdown sends for no filter.
            if !category.eq_ignore_ascii_case("all")
                && !product.category.eq_ignore_ascii_case(category.trim())
            {
                return false;
            }
        }
        if let Some(size) = self.size {
            if !product.sizes.contains(&size) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.offer_price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.offer_price > max {
                return false;
            }
        }
        !self.in_stock_only || product.is_available()
    }

    /// Returns the matching products, preserving input order.
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Sorts products newest first, the order the catalog grid shows them in.
pub fn newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StockStatus;
    use chrono::{Duration, Utc};

    fn product(id: &str, category: &str, rupees: i64, sizes: &[Size], stock: StockStatus) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            offer_quantity: 1,
            offer_price: Money::from_rupees(rupees),
            sizes: sizes.to_vec(),
            category: category.to_string(),
            description: None,
            stock_status: stock,
            image_key: None,
            created_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("a", "Men", 500, &[Size::M, Size::L], StockStatus::InStock),
            product("b", "Women", 1200, &[Size::S], StockStatus::InStock),
            product("c", "Men", 2000, &[Size::XL], StockStatus::OutOfStock),
            product("d", "Kids", 300, &[Size::S, Size::M], StockStatus::InStock),
        ]
    }

    fn ids(products: Vec<&Product>) -> Vec<&str> {
        products.into_iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let products = catalog();
        let filter = CatalogFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&products).len(), 4);
    }

    #[test]
    fn test_category_filter() {
        let products = catalog();
        assert_eq!(ids(CatalogFilter::new().category("men").apply(&products)), vec!["a", "c"]);
        assert_eq!(CatalogFilter::new().category("All").apply(&products).len(), 4);
        assert!(CatalogFilter::new().category("Accessories").apply(&products).is_empty());
    }

    #[test]
    fn test_size_and_price_filters() {
        let products = catalog();
        assert_eq!(ids(CatalogFilter::new().size(Size::M).apply(&products)), vec!["a", "d"]);

        let filter = CatalogFilter::new()
            .price_between(Some(Money::from_rupees(500)), Some(Money::from_rupees(1200)));
        assert_eq!(ids(filter.apply(&products)), vec!["a", "b"]);
    }

    #[test]
    fn test_in_stock_only() {
        let products = catalog();
        let filter = CatalogFilter::new().category("Men").in_stock_only();
        assert_eq!(ids(filter.apply(&products)), vec!["a"]);
    }

    #[test]
    fn test_newest_first() {
        let mut products = catalog();
        products[2].created_at = Utc::now() + Duration::hours(1);
        newest_first(&mut products);
        assert_eq!(products[0].id, "c");
    }
}
