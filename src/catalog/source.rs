//! Catalog Source Module
//!
//! The upstream product backend the gateway reads from.

use async_trait::async_trait;
use reqwest::{Client, Request};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

// == Source Error Enum ==
/// Failure reading from the product backend.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport or decoding failure
    #[error("request to catalog backend failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("catalog backend responded with status {0}")]
    Status(u16),
}

// == Catalog Source Trait ==
/// Read operations the gateway needs from the product backend.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Featured items shown on the home screen.
    async fn featured_items(&self) -> Result<Value, SourceError>;

    /// Products for the given ids.
    async fn product_batch(&self, ids: &[String]) -> Result<Value, SourceError>;
}

// == HTTP Catalog Source ==
/// `CatalogSource` backed by the product backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
    base_url: String,
}

impl HttpCatalogSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, path: &str, query: &[(&str, String)]) -> Result<Request, SourceError> {
        let mut builder = self.client.get(self.url(path));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        Ok(builder.build()?)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, SourceError> {
        let request = self.request(path, query)?;
        debug!(url = %request.url(), "fetching from catalog backend");

        let response = self.client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn featured_items(&self) -> Result<Value, SourceError> {
        self.get_json("featured-items", &[]).await
    }

    async fn product_batch(&self, ids: &[String]) -> Result<Value, SourceError> {
        self.get_json("products/batch", &[("ids", ids.join(","))]).await
    }
}
