//! Doofinder management API client.
//!
//! This module provides the reqwest-backed implementation of
//! `ManagementApi`. Every call is scoped to one search engine and
//! authenticated with the management API key.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::config::ManagementConfig;
use crate::errors::ManagementError;
use crate::interfaces::ManagementApi;
use crate::types::{CreateIndexRequest, IndexSummary, SearchEngine};

/// HTTP client for the Doofinder management API.
///
/// # Example
///
/// ```ignore
/// use doofinder_sync_repository::{ManagementClient, ManagementConfig, ManagementApi};
///
/// let config = ManagementConfig::new("eu1-api.doofinder.com", "api-key", "engine-hash");
/// let client = ManagementClient::new(&config)?;
/// let engine = client.get_search_engine().await?;
/// ```
pub struct ManagementClient {
    http: ReqwestClient,
    search_engine_url: Url,
    api_key: String,
}

impl ManagementClient {
    /// Create a new client for the search engine described by `config`.
    ///
    /// # Returns
    ///
    /// * `Ok(ManagementClient)` - A new client instance
    /// * `Err(ManagementError::Configuration)` - If the host, hash or key is unusable
    pub fn new(config: &ManagementConfig) -> Result<Self, ManagementError> {
        if config.api_key.trim().is_empty() {
            return Err(ManagementError::configuration("api key is empty"));
        }

        let search_engine_url = config.search_engine_url()?;

        let http = ReqwestClient::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ManagementError::configuration(e.to_string()))?;

        info!(
            url = %search_engine_url,
            timeout_secs = config.request_timeout.as_secs(),
            "Created Doofinder management client"
        );

        Ok(Self {
            http,
            search_engine_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Build the URL of a resource below the search engine.
    ///
    /// Segments are percent-encoded, so item ids may contain any character.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ManagementError> {
        let mut url = self.search_engine_url.clone();
        url.path_segments_mut()
            .map_err(|_| ManagementError::configuration("search engine url cannot be a base"))?
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the response body of a successful call.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<String, ManagementError> {
        debug!(method = %method, url = %url, "Management API request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, format!("Token {}", self.api_key))
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ManagementError::transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ManagementError::transport(e.to_string()))?;

        if !status.is_success() {
            error!(
                method = %method,
                url = %url,
                status = %status,
                body = %text,
                "Management API request failed"
            );
            return Err(ManagementError::from_response(status.as_u16(), text));
        }

        Ok(text)
    }
}

#[async_trait]
impl ManagementApi for ManagementClient {
    async fn get_search_engine(&self) -> Result<Option<SearchEngine>, ManagementError> {
        let text = self
            .execute(Method::GET, self.search_engine_url.clone(), None)
            .await?;

        if text.trim().is_empty() {
            return Ok(None);
        }

        let engine: Option<SearchEngine> = serde_json::from_str(&text)?;
        Ok(engine)
    }

    async fn list_indices(&self) -> Result<Vec<IndexSummary>, ManagementError> {
        let text = self
            .execute(Method::GET, self.endpoint(&["indices"])?, None)
            .await?;

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let indices: Vec<IndexSummary> = serde_json::from_str(&text)?;
        Ok(indices)
    }

    async fn create_index(&self, request: &CreateIndexRequest) -> Result<(), ManagementError> {
        let body = serde_json::to_value(request)?;
        self.execute(Method::POST, self.endpoint(&["indices"])?, Some(body))
            .await?;

        debug!(index = %request.name, "Index created");
        Ok(())
    }

    async fn create_temporary_index(&self, index_name: &str) -> Result<(), ManagementError> {
        let url = self.endpoint(&["indices", index_name, "temp"])?;
        self.execute(Method::POST, url, None).await?;

        debug!(index = %index_name, "Temporary index created");
        Ok(())
    }

    async fn create_temp_bulk(
        &self,
        index_name: &str,
        items: &[Value],
    ) -> Result<(), ManagementError> {
        let url = self.endpoint(&["indices", index_name, "temp", "items", "_bulk"])?;
        self.execute(Method::POST, url, Some(Value::Array(items.to_vec())))
            .await?;

        debug!(index = %index_name, count = items.len(), "Bulk items sent to temporary index");
        Ok(())
    }

    async fn replace_index(&self, index_name: &str) -> Result<(), ManagementError> {
        let url = self.endpoint(&["indices", index_name, "_replace_by_temp"])?;
        self.execute(Method::POST, url, None).await?;

        info!(index = %index_name, "Index replaced by its temporary counterpart");
        Ok(())
    }

    async fn create_item(&self, index_name: &str, data: &Value) -> Result<(), ManagementError> {
        let url = self.endpoint(&["indices", index_name, "items"])?;
        self.execute(Method::POST, url, Some(data.clone())).await?;
        Ok(())
    }

    async fn update_item(
        &self,
        index_name: &str,
        item_id: &str,
        data: &Value,
    ) -> Result<(), ManagementError> {
        let url = self.endpoint(&["indices", index_name, "items", item_id])?;
        self.execute(Method::PATCH, url, Some(data.clone())).await?;
        Ok(())
    }

    async fn delete_item(&self, index_name: &str, item_id: &str) -> Result<(), ManagementError> {
        let url = self.endpoint(&["indices", index_name, "items", item_id])?;
        self.execute(Method::DELETE, url, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ManagementClient {
        let config = ManagementConfig::new("eu1-api.doofinder.com", "secret", "abc123");
        ManagementClient::new(&config).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_api_key() {
        let config = ManagementConfig::new("eu1-api.doofinder.com", "", "abc123");
        assert!(matches!(
            ManagementClient::new(&config),
            Err(ManagementError::Configuration(_))
        ));
    }

    #[test]
    fn test_endpoint_temp_bulk() {
        let client = test_client();
        let url = client
            .endpoint(&["indices", "product", "temp", "items", "_bulk"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://eu1-api.doofinder.com/api/v2/search_engines/abc123/indices/product/temp/items/_bulk"
        );
    }

    #[test]
    fn test_endpoint_replace() {
        let client = test_client();
        let url = client
            .endpoint(&["indices", "post", "_replace_by_temp"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://eu1-api.doofinder.com/api/v2/search_engines/abc123/indices/post/_replace_by_temp"
        );
    }

    #[test]
    fn test_endpoint_encodes_item_id() {
        let client = test_client();
        let url = client
            .endpoint(&["indices", "product", "items", "sku 1/a"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://eu1-api.doofinder.com/api/v2/search_engines/abc123/indices/product/items/sku%201%2Fa"
        );
    }
}
