//! Mock management API for testing and local development.
//!
//! `MockManagementApi` records every call it receives and can be scripted
//! to fail specific operations, allowing the indexing workflow to be tested
//! without network access.
//!
//! # Example
//!
//! ```ignore
//! use doofinder_sync_repository::{ManagementError, MockManagementApi, Operation};
//!
//! let mock = MockManagementApi::new();
//! mock.fail_next(Operation::CreateTemporaryIndex, ManagementError::not_found("no index"));
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ManagementError;
use crate::interfaces::ManagementApi;
use crate::types::{CreateIndexRequest, IndexSummary, SearchEngine};

/// Management API operation, used to script failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetSearchEngine,
    ListIndices,
    CreateIndex,
    CreateTemporaryIndex,
    CreateTempBulk,
    ReplaceIndex,
    CreateItem,
    UpdateItem,
    DeleteItem,
}

/// A call received by the mock, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagementCall {
    GetSearchEngine,
    ListIndices,
    CreateIndex(CreateIndexRequest),
    CreateTemporaryIndex(String),
    CreateTempBulk {
        index_name: String,
        items: Vec<Value>,
    },
    ReplaceIndex(String),
    CreateItem {
        index_name: String,
        data: Value,
    },
    UpdateItem {
        index_name: String,
        item_id: String,
        data: Value,
    },
    DeleteItem {
        index_name: String,
        item_id: String,
    },
}

impl ManagementCall {
    /// The operation this call invoked.
    pub fn operation(&self) -> Operation {
        match self {
            Self::GetSearchEngine => Operation::GetSearchEngine,
            Self::ListIndices => Operation::ListIndices,
            Self::CreateIndex(_) => Operation::CreateIndex,
            Self::CreateTemporaryIndex(_) => Operation::CreateTemporaryIndex,
            Self::CreateTempBulk { .. } => Operation::CreateTempBulk,
            Self::ReplaceIndex(_) => Operation::ReplaceIndex,
            Self::CreateItem { .. } => Operation::CreateItem,
            Self::UpdateItem { .. } => Operation::UpdateItem,
            Self::DeleteItem { .. } => Operation::DeleteItem,
        }
    }
}

/// Mock management API that records calls and replays scripted failures.
///
/// Every operation succeeds unless a failure was queued for it with
/// [`MockManagementApi::fail_next`]. Queued failures are consumed in order,
/// one per call.
pub struct MockManagementApi {
    search_engine: Option<SearchEngine>,
    indices: Mutex<Vec<IndexSummary>>,
    calls: Mutex<Vec<ManagementCall>>,
    failures: Mutex<HashMap<Operation, VecDeque<ManagementError>>>,
}

impl MockManagementApi {
    /// Create a mock whose search engine exists and has no indices.
    pub fn new() -> Self {
        Self::with_search_engine(Some(SearchEngine {
            hash: "mock-hash".to_string(),
            name: "Mock engine".to_string(),
            language: None,
            site_url: None,
            indices: Vec::new(),
        }))
    }

    /// Create a mock answering get-search-engine with `search_engine`.
    pub fn with_search_engine(search_engine: Option<SearchEngine>) -> Self {
        Self {
            search_engine,
            indices: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Pre-populate the indices returned by list-indices.
    pub fn with_indices<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut indices = self.indices.lock().unwrap_or_else(PoisonError::into_inner);
            for name in names {
                indices.push(IndexSummary {
                    name: name.into(),
                    preset: None,
                    options: None,
                });
            }
        }
        self
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: Operation, error: ManagementError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<ManagementCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Operations received so far, in order.
    pub fn operations(&self) -> Vec<Operation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(ManagementCall::operation)
            .collect()
    }

    /// Number of calls received for `operation`.
    pub fn count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Forget recorded calls, keeping scripted failures and indices.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn record(&self, call: ManagementCall) -> Result<(), ManagementError> {
        let operation = call.operation();
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);

        match self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for MockManagementApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ManagementApi for MockManagementApi {
    async fn get_search_engine(&self) -> Result<Option<SearchEngine>, ManagementError> {
        self.record(ManagementCall::GetSearchEngine)?;
        Ok(self.search_engine.clone())
    }

    async fn list_indices(&self) -> Result<Vec<IndexSummary>, ManagementError> {
        self.record(ManagementCall::ListIndices)?;
        Ok(self.indices.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    async fn create_index(&self, request: &CreateIndexRequest) -> Result<(), ManagementError> {
        self.record(ManagementCall::CreateIndex(request.clone()))?;
        self.indices.lock().unwrap_or_else(PoisonError::into_inner).push(IndexSummary {
            name: request.name.clone(),
            preset: request.preset.clone(),
            options: None,
        });
        Ok(())
    }

    async fn create_temporary_index(&self, index_name: &str) -> Result<(), ManagementError> {
        self.record(ManagementCall::CreateTemporaryIndex(index_name.to_string()))
    }

    async fn create_temp_bulk(
        &self,
        index_name: &str,
        items: &[Value],
    ) -> Result<(), ManagementError> {
        self.record(ManagementCall::CreateTempBulk {
            index_name: index_name.to_string(),
            items: items.to_vec(),
        })
    }

    async fn replace_index(&self, index_name: &str) -> Result<(), ManagementError> {
        self.record(ManagementCall::ReplaceIndex(index_name.to_string()))
    }

    async fn create_item(&self, index_name: &str, data: &Value) -> Result<(), ManagementError> {
        self.record(ManagementCall::CreateItem {
            index_name: index_name.to_string(),
            data: data.clone(),
        })
    }

    async fn update_item(
        &self,
        index_name: &str,
        item_id: &str,
        data: &Value,
    ) -> Result<(), ManagementError> {
        self.record(ManagementCall::UpdateItem {
            index_name: index_name.to_string(),
            item_id: item_id.to_string(),
            data: data.clone(),
        })
    }

    async fn delete_item(&self, index_name: &str, item_id: &str) -> Result<(), ManagementError> {
        self.record(ManagementCall::DeleteItem {
            index_name: index_name.to_string(),
            item_id: item_id.to_string(),
        })
    }
}
