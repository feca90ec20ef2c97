//! Management API trait definition.
//!
//! This module defines the set of remote operations the indexer relies on.
//! Any type implementing it can be wrapped transparently, which is how the
//! throttling decorator is layered over the HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ManagementError;
use crate::types::{CreateIndexRequest, IndexSummary, SearchEngine};

/// Remote operations exposed by the Doofinder management API.
///
/// All operations are scoped to the search engine the implementation was
/// configured with. Index names are item type names.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so they can be held behind a
/// trait object across await points.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Fetch the configured search engine.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(SearchEngine))` - The engine exists and is accessible
    /// * `Ok(None)` - The service answered without an engine
    /// * `Err(ManagementError::NotFound)` - The hash does not match an engine
    /// * `Err(ManagementError::NotAllowed)` - The API key was rejected
    async fn get_search_engine(&self) -> Result<Option<SearchEngine>, ManagementError>;

    /// List the indices of the search engine.
    async fn list_indices(&self) -> Result<Vec<IndexSummary>, ManagementError>;

    /// Create a production index.
    async fn create_index(&self, request: &CreateIndexRequest) -> Result<(), ManagementError>;

    /// Create the temporary counterpart of an index.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The temporary index was created
    /// * `Err(ManagementError::NotFound)` - The production index does not exist
    /// * `Err(ManagementError)` - Any other failure, commonly "already exists"
    async fn create_temporary_index(&self, index_name: &str) -> Result<(), ManagementError>;

    /// Upload a batch of items into the temporary index.
    async fn create_temp_bulk(
        &self,
        index_name: &str,
        items: &[Value],
    ) -> Result<(), ManagementError>;

    /// Atomically swap the temporary index into production.
    async fn replace_index(&self, index_name: &str) -> Result<(), ManagementError>;

    /// Create a single item in a production index.
    async fn create_item(&self, index_name: &str, data: &Value) -> Result<(), ManagementError>;

    /// Update a single item in place.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The item was updated
    /// * `Err(ManagementError::BadRequest)` - The item or its index does not exist
    async fn update_item(
        &self,
        index_name: &str,
        item_id: &str,
        data: &Value,
    ) -> Result<(), ManagementError>;

    /// Delete a single item.
    async fn delete_item(&self, index_name: &str, item_id: &str) -> Result<(), ManagementError>;
}

#[async_trait]
impl<T: ManagementApi + ?Sized> ManagementApi for Arc<T> {
    async fn get_search_engine(&self) -> Result<Option<SearchEngine>, ManagementError> {
        (**self).get_search_engine().await
    }

    async fn list_indices(&self) -> Result<Vec<IndexSummary>, ManagementError> {
        (**self).list_indices().await
    }

    async fn create_index(&self, request: &CreateIndexRequest) -> Result<(), ManagementError> {
        (**self).create_index(request).await
    }

    async fn create_temporary_index(&self, index_name: &str) -> Result<(), ManagementError> {
        (**self).create_temporary_index(index_name).await
    }

    async fn create_temp_bulk(
        &self,
        index_name: &str,
        items: &[Value],
    ) -> Result<(), ManagementError> {
        (**self).create_temp_bulk(index_name, items).await
    }

    async fn replace_index(&self, index_name: &str) -> Result<(), ManagementError> {
        (**self).replace_index(index_name).await
    }

    async fn create_item(&self, index_name: &str, data: &Value) -> Result<(), ManagementError> {
        (**self).create_item(index_name, data).await
    }

    async fn update_item(
        &self,
        index_name: &str,
        item_id: &str,
        data: &Value,
    ) -> Result<(), ManagementError> {
        (**self).update_item(index_name, item_id, data).await
    }

    async fn delete_item(&self, index_name: &str, item_id: &str) -> Result<(), ManagementError> {
        (**self).delete_item(index_name, item_id).await
    }
}
