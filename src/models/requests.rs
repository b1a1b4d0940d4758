//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;

/// Query string for GET /products/batch
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchQuery {
    /// Comma separated product ids
    #[serde(default)]
    pub ids: Option<String>,
}

impl BatchQuery {
    /// Splits the raw `ids` parameter. Blank segments are dropped later
    /// during normalization.
    pub fn ids(&self) -> Vec<&str> {
        self.ids
            .as_deref()
            .map(|raw| raw.split(',').collect())
            .unwrap_or_default()
    }
}

/// Request body for POST /cache/invalidate
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Key prefix to drop
    pub prefix: String,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    /// An empty prefix would match every key; DELETE /cache is the way to do that.
    pub fn validate(&self) -> Option<String> {
        if self.prefix.is_empty() {
            return Some("Prefix cannot be empty".to_string());
        }
        None
    }
}
