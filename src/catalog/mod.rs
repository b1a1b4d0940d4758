//! Catalog Module
//!
//! Cached read access to the product backend: featured items and product
//! batches, served through the keyed fetch cache.

pub mod keys;
mod service;
mod source;

pub use service::{CatalogService, CatalogTtls};
pub use source::{CatalogSource, HttpCatalogSource, SourceError};
