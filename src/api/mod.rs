//! API Module
//!
//! HTTP handlers and routing for the catalog gateway.
//!
//! # Endpoints
//! - `GET /featured-items` - Cached featured items
//! - `GET /products/batch?ids=a,b` - Cached product batch
//! - `POST /cache/invalidate` - Drop every entry under a key prefix
//! - `DELETE /cache` - Drop every entry and in-flight fetch
//! - `GET /cache/loading/:key` - Whether a fetch for the key is in flight
//! - `GET /cache/stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
