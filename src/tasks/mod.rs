//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry purge: physically removes stale cache entries at a fixed interval

mod purge;

pub use purge::spawn_purge_task;
