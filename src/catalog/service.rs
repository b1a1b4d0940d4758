//! Catalog Service Module
//!
//! Wraps a `CatalogSource` with the keyed fetch cache.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::cache::KeyedFetchCache;
use crate::catalog::keys;
use crate::catalog::CatalogSource;
use crate::config::Config;
use crate::error::FetchError;

/// Freshness windows per catalog resource.
#[derive(Debug, Clone, Copy)]
pub struct CatalogTtls {
    pub featured: Duration,
    pub favorites: Duration,
}

impl Default for CatalogTtls {
    fn default() -> Self {
        Self {
            featured: Duration::from_secs(10 * 60),
            favorites: Duration::from_secs(2 * 60),
        }
    }
}

impl From<&Config> for CatalogTtls {
    fn from(config: &Config) -> Self {
        Self {
            featured: config.featured_ttl(),
            favorites: config.favorites_ttl(),
        }
    }
}

// == Catalog Service ==
/// Cached catalog reads. Cheap to clone.
#[derive(Clone)]
pub struct CatalogService {
    cache: KeyedFetchCache<Value>,
    source: Arc<dyn CatalogSource>,
    ttls: CatalogTtls,
}

impl CatalogService {
    pub fn new(
        cache: KeyedFetchCache<Value>,
        source: Arc<dyn CatalogSource>,
        ttls: CatalogTtls,
    ) -> Self {
        Self {
            cache,
            source,
            ttls,
        }
    }

    /// The cache backing this service.
    pub fn cache(&self) -> &KeyedFetchCache<Value> {
        &self.cache
    }

    /// Featured items, cached under [`keys::FEATURED_ITEMS`].
    pub async fn featured_items(&self) -> Result<Value, FetchError> {
        let source = Arc::clone(&self.source);
        self.cache
            .cached_api_call(
                keys::FEATURED_ITEMS,
                move || async move { source.featured_items().await },
                self.ttls.featured,
            )
            .await
    }

    /// Products for `ids`, cached per normalized id set.
    ///
    /// An empty id list short-circuits to an empty array.
    pub async fn product_batch<S: AsRef<str>>(&self, ids: &[S]) -> Result<Value, FetchError> {
        let ids = keys::normalize_ids(ids);
        if ids.is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        let key = keys::favorite_products(&ids);
        let source = Arc::clone(&self.source);
        self.cache
            .cached_api_call(
                &key,
                move || async move { source.product_batch(&ids).await },
                self.ttls.favorites,
            )
            .await
    }

    /// Drops every cached product batch, e.g. after a product update.
    pub fn invalidate_products(&self) -> usize {
        let removed = self.cache.invalidate(keys::FAVORITE_PRODUCTS_PREFIX);
        info!(removed, "product batches invalidated");
        removed
    }
}
