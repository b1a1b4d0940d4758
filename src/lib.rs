//! Catalog Cache - request-coalescing TTL cache and cached catalog gateway
//!
//! [`KeyedFetchCache`] serves fresh values from memory and runs at most one
//! fetch per key at a time, sharing its outcome with every concurrent caller.
//! The [`api`] module exposes it as a small HTTP gateway in front of the
//! product backend.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::KeyedFetchCache;
pub use config::Config;
pub use error::FetchError;
pub use tasks::spawn_purge_task;
