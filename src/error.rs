//! Error types for the cache and the catalog gateway
//!
//! Provides unified error handling using thiserror.

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Fetch Error Enum ==
/// Outcome of a failed fetch, shared by every caller that joined it.
///
/// Cloning is cheap: the underlying error sits behind an `Arc`.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// The fetch function returned an error
    #[error("fetch failed: {0}")]
    Upstream(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// The fetch function or its future panicked
    #[error("fetch panicked: {0}")]
    Panicked(String),

    /// The fetch task was dropped before it settled
    #[error("fetch cancelled before settling")]
    Cancelled,
}

impl FetchError {
    pub(crate) fn upstream<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FetchError::Upstream(Arc::new(error))
    }

    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic payload".to_string()
        };
        FetchError::Panicked(message)
    }

    /// Returns the original fetch error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            FetchError::Upstream(error) => error.downcast_ref::<E>(),
            _ => None,
        }
    }
}

// == Api Error Enum ==
/// Error type for the gateway HTTP surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream catalog failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FetchError> for ApiError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Upstream(_) => ApiError::Upstream(error.to_string()),
            FetchError::Panicked(_) | FetchError::Cancelled => {
                ApiError::Internal(error.to_string())
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
