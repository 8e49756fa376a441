//! Cached page renderings.
//!
//! Product pages are built from the static catalog and cached by path, so
//! they change only on redeploy or when the Shopify webhook receiver asks
//! for a regeneration. The "rendering" here is the serialized JSON payload
//! the storefront serves; templating is deliberately out of scope.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{Catalog, Product};

/// Path of the homepage rendering.
pub const HOME_PATH: &str = "/";

/// Cache capacity; comfortably above the catalog size.
const MAX_CACHED_PAGES: u64 = 64;

/// Errors building a page rendering.
#[derive(Debug, Error)]
pub enum PageError {
    /// The path does not correspond to any cacheable page.
    #[error("no page at path: {0}")]
    UnknownPath(String),

    /// The path names a product the catalog does not have.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// Payload serialization failed.
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The rendering path for a product slug.
#[must_use]
pub fn product_path(slug: &str) -> String {
    format!("/products/{slug}")
}

// =============================================================================
// Page payloads
// =============================================================================

/// Product card on the homepage.
#[derive(Debug, Serialize)]
struct ProductSummary {
    slug: String,
    name: String,
    price: String,
    color: Option<String>,
    preorder: bool,
    ship_estimate: Option<String>,
    image: String,
}

#[derive(Debug, Serialize)]
struct HomePage {
    generated_at: DateTime<Utc>,
    products: Vec<ProductSummary>,
}

/// One advertised size and whether it is purchasable.
#[derive(Debug, Serialize)]
struct SizeOffer {
    label: String,
    available: bool,
}

#[derive(Debug, Serialize)]
struct ProductImagesPayload {
    front: String,
    back: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProductPage {
    generated_at: DateTime<Utc>,
    slug: String,
    name: String,
    price: String,
    color: Option<String>,
    description: String,
    details: Vec<String>,
    care: Vec<String>,
    shipping: String,
    preorder: bool,
    ship_estimate: Option<String>,
    sizes: Vec<SizeOffer>,
    images: ProductImagesPayload,
}

impl ProductSummary {
    fn from_product(product: &Product) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            price: product.price.display(),
            color: product.color.clone(),
            preorder: product.preorder,
            ship_estimate: product.ship_estimate.clone(),
            image: product.images.front.clone(),
        }
    }
}

impl ProductPage {
    fn from_product(product: &Product) -> Self {
        // Sizes without a resolvable variant render as unselectable
        let sizes = product
            .sizes()
            .iter()
            .map(|label| SizeOffer {
                label: label.clone(),
                available: product.variant_for_size(label).is_some(),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            price: product.price.display(),
            color: product.color.clone(),
            description: product.description.clone(),
            details: product.details.clone(),
            care: product.care.clone(),
            shipping: product.shipping.clone(),
            preorder: product.preorder,
            ship_estimate: product.ship_estimate.clone(),
            sizes,
            images: ProductImagesPayload {
                front: product.images.front.clone(),
                back: product.images.back.clone(),
            },
        }
    }
}

// =============================================================================
// PageCache
// =============================================================================

/// Cache of serialized page renderings, keyed by path.
#[derive(Clone)]
pub struct PageCache {
    cache: Cache<String, Arc<String>>,
}

impl PageCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().max_capacity(MAX_CACHED_PAGES).build(),
        }
    }

    /// The rendering for a path, building and caching it on first access.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown paths or products.
    pub async fn page(&self, path: &str, catalog: &Catalog) -> Result<Arc<String>, PageError> {
        if let Some(body) = self.cache.get(path).await {
            return Ok(body);
        }

        let body = Arc::new(build_page(path, catalog)?);
        self.cache.insert(path.to_string(), Arc::clone(&body)).await;
        Ok(body)
    }

    /// Rebuild a path's rendering unconditionally and replace the cached
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown paths or products; the previous entry is
    /// left in place in that case.
    pub async fn revalidate(&self, path: &str, catalog: &Catalog) -> Result<(), PageError> {
        let body = Arc::new(build_page(path, catalog)?);
        self.cache.insert(path.to_string(), body).await;
        Ok(())
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the serialized rendering for a path.
fn build_page(path: &str, catalog: &Catalog) -> Result<String, PageError> {
    if path == HOME_PATH {
        let page = HomePage {
            generated_at: Utc::now(),
            products: catalog
                .products()
                .iter()
                .map(ProductSummary::from_product)
                .collect(),
        };
        return Ok(serde_json::to_string(&page)?);
    }

    if let Some(slug) = path.strip_prefix("/products/") {
        let product = catalog
            .find_by_slug(slug)
            .ok_or_else(|| PageError::UnknownProduct(slug.to_string()))?;
        return Ok(serde_json::to_string(&ProductPage::from_product(product))?);
    }

    Err(PageError::UnknownPath(path.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_home_page_lists_all_products() {
        let catalog = Catalog::builtin();
        let pages = PageCache::new();

        let body = pages.page(HOME_PATH, &catalog).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();

        let products = value["products"].as_array().unwrap();
        assert_eq!(products.len(), catalog.products().len());
        assert_eq!(products[0]["slug"], "twisted-love-black");
        assert_eq!(products[0]["price"], "$55.00");
    }

    #[tokio::test]
    async fn test_product_page_marks_unavailable_sizes() {
        let catalog = Catalog::builtin();
        let pages = PageCache::new();

        let body = pages
            .page(&product_path("twisted-love-black"), &catalog)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();

        let sizes = value["sizes"].as_array().unwrap();
        let xxl = sizes.iter().find(|s| s["label"] == "XXL").unwrap();
        assert_eq!(xxl["available"], false);
        let m = sizes.iter().find(|s| s["label"] == "M").unwrap();
        assert_eq!(m["available"], true);
    }

    #[tokio::test]
    async fn test_unknown_product_and_path() {
        let catalog = Catalog::builtin();
        let pages = PageCache::new();

        assert!(matches!(
            pages.page("/products/missing", &catalog).await.unwrap_err(),
            PageError::UnknownProduct(_)
        ));
        assert!(matches!(
            pages.page("/collections/all", &catalog).await.unwrap_err(),
            PageError::UnknownPath(_)
        ));
    }

    #[tokio::test]
    async fn test_page_is_cached_until_revalidated() {
        let catalog = Catalog::builtin();
        let pages = PageCache::new();
        let path = product_path("collab-white");

        let first = pages.page(&path, &catalog).await.unwrap();
        let second = pages.page(&path, &catalog).await.unwrap();
        // Same Arc - served from cache, not rebuilt
        assert!(Arc::ptr_eq(&first, &second));

        pages.revalidate(&path, &catalog).await.unwrap();
        let third = pages.page(&path, &catalog).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[tokio::test]
    async fn test_revalidate_unknown_slug_fails() {
        let catalog = Catalog::builtin();
        let pages = PageCache::new();

        assert!(pages.revalidate("/products/missing", &catalog).await.is_err());
    }
}
