//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::pages::PageCache;
use crate::services::checkout::CheckoutInitiator;
use crate::shopify::StorefrontClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; hands out references to shared resources
/// rather than letting handlers reach into globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    pages: PageCache,
    checkout: CheckoutInitiator<StorefrontClient>,
}

impl AppState {
    /// Create application state with the built-in catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_catalog(config, Catalog::builtin())
    }

    /// Create application state with an explicit catalog.
    #[must_use]
    pub fn with_catalog(config: StorefrontConfig, catalog: Catalog) -> Self {
        let storefront = StorefrontClient::new(&config.shopify);

        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                pages: PageCache::new(),
                checkout: CheckoutInitiator::new(storefront),
                config,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the static product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the page rendering cache.
    #[must_use]
    pub fn pages(&self) -> &PageCache {
        &self.inner.pages
    }

    /// Get a reference to the checkout initiator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutInitiator<StorefrontClient> {
        &self.inner.checkout
    }
}
