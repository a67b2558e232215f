//! # Catalog Commands
//!
//! ```text
//! GET /api/products?category=Men&size=M&maxPrice=150000
//!      │
//!      ├── ProductQuery  { category, limit }      → SQL (newest first)
//!      └── CatalogFilter { size, price, stock }   → in memory
//!      │
//!      ▼
//! Vec<ProductView>  (product + resolved image URL)
//! ```
//!
//! A failed read surfaces as `UPSTREAM_FETCH_ERROR`; the frontend shows an
//! empty grid with an error banner and the cart keeps working.

use ekaksha_core::validation::validate_object_key;
use ekaksha_core::{CatalogFilter, Category, Money, Product, Size};
use ekaksha_db::ProductQuery;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::{DbState, ObjectState};

/// A product with its image resolved to a public URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub image_url: Option<String>,
}

impl ProductView {
    pub fn new(product: Product, objects: &ObjectState) -> Self {
        let image_url = objects.image_url(product.image_key.as_deref());
        ProductView { product, image_url }
    }
}

/// Listing parameters as they arrive in a query string. Prices are in paise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogParams {
    pub category: Option<String>,
    pub size: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub in_stock_only: Option<bool>,
    pub limit: Option<u32>,
}

impl CatalogParams {
    /// Splits the parameters into the database query and the in-memory filter.
    pub fn into_parts(self) -> ApiResult<(ProductQuery, CatalogFilter)> {
        let size = self
            .size
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<Size>)
            .transpose()
            .map_err(|e| ApiError::validation(e.to_string()))?;

        let query = ProductQuery {
            category: self.category.clone(),
            limit: self.limit,
        };
        let filter = CatalogFilter {
            category: self.category,
            size,
            min_price: self.min_price.map(Money::from_paise),
            max_price: self.max_price.map(Money::from_paise),
            in_stock_only: self.in_stock_only.unwrap_or(false),
        };
        Ok((query, filter))
    }
}

/// Lists products newest first, narrowed by `filter`.
pub async fn list_products(
    db: &DbState,
    objects: &ObjectState,
    query: &ProductQuery,
    filter: &CatalogFilter,
) -> ApiResult<Vec<ProductView>> {
    debug!(?query, ?filter, "list_products command");

    let products = db
        .inner()
        .products()
        .list(query)
        .await
        .map_err(|e| ApiError::upstream("products", e))?;

    Ok(products
        .into_iter()
        .filter(|p| filter.matches(p))
        .map(|p| ProductView::new(p, objects))
        .collect())
}

pub async fn list_categories(db: &DbState) -> ApiResult<Vec<Category>> {
    debug!("list_categories command");
    db.inner()
        .categories()
        .list()
        .await
        .map_err(|e| ApiError::upstream("categories", e))
}

/// Public URL for an object key in the image bucket.
pub fn product_image_url(objects: &ObjectState, key: &str) -> ApiResult<String> {
    validate_object_key(key).map_err(|e| ApiError::validation(e.to_string()))?;
    Ok(objects.store().public_url(objects.bucket(), key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::testing::test_state;
    use ekaksha_core::StockStatus;
    use ekaksha_db::NewProduct;

    fn new_product(name: &str, category: &str, rupees: i64, sizes: &[Size]) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            offer_quantity: 1,
            offer_price: Money::from_rupees(rupees),
            sizes: sizes.to_vec(),
            category: category.to_string(),
            description: None,
            stock_status: StockStatus::InStock,
        }
    }

    #[test]
    fn test_params_into_parts() {
        let params = CatalogParams {
            category: Some("Men".into()),
            size: Some("xl".into()),
            max_price: Some(150_000),
            limit: Some(8),
            ..Default::default()
        };
        let (query, filter) = params.into_parts().unwrap();
        assert_eq!(query.category.as_deref(), Some("Men"));
        assert_eq!(query.limit, Some(8));
        assert_eq!(filter.size, Some(Size::XL));
        assert_eq!(filter.max_price, Some(Money::from_rupees(1500)));
        assert!(!filter.in_stock_only);

        let bad = CatalogParams {
            size: Some("XXXL".into()),
            ..Default::default()
        };
        assert_eq!(bad.into_parts().unwrap_err().code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_list_products_filters() {
        let (state, _storage, _dir) = test_state().await;
        let products = state.db.inner().products();
        products.insert(&new_product("Kurta", "Men", 999, &[Size::M])).await.unwrap();
        products.insert(&new_product("Saree", "Women", 2499, &[Size::M])).await.unwrap();
        products.insert(&new_product("Shirt", "Men", 1499, &[Size::L])).await.unwrap();

        let all = list_products(&state.db, &state.objects, &ProductQuery::new(), &CatalogFilter::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let (query, filter) = CatalogParams {
            category: Some("men".into()),
            size: Some("M".into()),
            ..Default::default()
        }
        .into_parts()
        .unwrap();
        let men_m = list_products(&state.db, &state.objects, &query, &filter).await.unwrap();
        assert_eq!(men_m.len(), 1);
        assert_eq!(men_m[0].product.name, "Kurta");
        assert_eq!(men_m[0].image_url, None);
    }

    #[tokio::test]
    async fn test_closed_database_is_upstream_error() {
        let (state, _storage, _dir) = test_state().await;
        state.db.inner().close().await;

        let err = list_categories(&state.db).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamFetchError);
    }

    #[tokio::test]
    async fn test_product_image_url() {
        let (state, _storage, _dir) = test_state().await;
        assert_eq!(
            product_image_url(&state.objects, "1700_kurta.jpg").unwrap(),
            "http://shop.test/storage/v1/object/public/outfit_images/1700_kurta.jpg"
        );
        assert!(product_image_url(&state.objects, "../secret").is_err());
    }

    #[test]
    fn test_product_view_flattens() {
        let product = Product {
            id: "p1".into(),
            name: "Kurta".into(),
            offer_quantity: 2,
            offer_price: Money::from_rupees(999),
            sizes: vec![Size::M],
            category: "Men".into(),
            description: None,
            stock_status: StockStatus::InStock,
            image_key: Some("k.jpg".into()),
            created_at: chrono::Utc::now(),
        };
        let view = ProductView {
            product,
            image_url: Some("http://shop.test/k.jpg".into()),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["offerQuantity"], 2);
        assert_eq!(json["imageUrl"], "http://shop.test/k.jpg");
    }
}
