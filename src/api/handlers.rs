//! API Handlers
//!
//! HTTP request handlers for the catalog gateway and cache administration.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::KeyedFetchCache;
use crate::catalog::{CatalogService, CatalogSource, CatalogTtls};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    BatchQuery, ClearResponse, HealthResponse, InvalidateRequest, InvalidateResponse,
    LoadingResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached catalog reads
    pub catalog: CatalogService,
}

impl AppState {
    /// Creates a new AppState around an existing catalog service.
    pub fn new(catalog: CatalogService) -> Self {
        Self { catalog }
    }

    /// Creates a new AppState from configuration and an upstream source.
    pub fn from_config(config: &Config, source: Arc<dyn CatalogSource>) -> Self {
        let cache = KeyedFetchCache::with_default_ttl(config.default_ttl());
        Self::new(CatalogService::new(cache, source, CatalogTtls::from(config)))
    }

    /// The cache shared by every handler.
    pub fn cache(&self) -> &KeyedFetchCache<Value> {
        self.catalog.cache()
    }
}

/// Handler for GET /featured-items
pub async fn featured_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let items = state.catalog.featured_items().await?;
    Ok(Json(items))
}

/// Handler for GET /products/batch?ids=a,b
pub async fn batch_handler(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> Result<Json<Value>> {
    let products = state.catalog.product_batch(&query.ids()).await?;
    Ok(Json(products))
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let removed = state.cache().invalidate(&req.prefix);
    Ok(Json(InvalidateResponse::new(req.prefix, removed)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache().clear();
    Json(ClearResponse::cleared())
}

/// Handler for GET /cache/loading/:key
pub async fn loading_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<LoadingResponse> {
    let loading = state.cache().is_loading(&key);
    Json(LoadingResponse::new(key, loading))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache().stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
