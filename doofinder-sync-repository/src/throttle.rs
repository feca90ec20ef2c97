//! Call throttling for the management API.
//!
//! The Doofinder management API enforces a per-key request quota. `Throttle`
//! wraps any `ManagementApi` and delays each call until the configured
//! minimum interval has elapsed since the previous one, queuing concurrent
//! callers behind each other.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::errors::ManagementError;
use crate::interfaces::ManagementApi;
use crate::types::{CreateIndexRequest, IndexSummary, SearchEngine};

/// Rate limiting decorator over a management API client.
///
/// The wrapper exposes exactly the same operations as the inner client.
/// Errors are never swallowed: they are returned unchanged after the delay.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use doofinder_sync_repository::{ManagementClient, Throttle};
///
/// let client = Throttle::new(ManagementClient::new(&config)?, Duration::from_millis(500));
/// ```
pub struct Throttle<C> {
    inner: C,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl<C: ManagementApi> Throttle<C> {
    /// Wrap `inner` so that calls are spaced by at least `min_interval`.
    pub fn new(inner: C, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next call is allowed and claim the slot.
    ///
    /// The lock is held while sleeping so waiting callers are served in turn.
    async fn wait_turn(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                debug!(delay_ms = delay.as_millis() as u64, "Throttling management API call");
                sleep(delay).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

#[async_trait]
impl<C: ManagementApi> ManagementApi for Throttle<C> {
    async fn get_search_engine(&self) -> Result<Option<SearchEngine>, ManagementError> {
        self.wait_turn().await;
        self.inner.get_search_engine().await
    }

    async fn list_indices(&self) -> Result<Vec<IndexSummary>, ManagementError> {
        self.wait_turn().await;
        self.inner.list_indices().await
    }

    async fn create_index(&self, request: &CreateIndexRequest) -> Result<(), ManagementError> {
        self.wait_turn().await;
        self.inner.create_index(request).await
    }

    async fn create_temporary_index(&self, index_name: &str) -> Result<(), ManagementError> {
        self.wait_turn().await;
        self.inner.create_temporary_index(index_name).await
    }

    async fn create_temp_bulk(
        &self,
        index_name: &str,
        items: &[Value],
    ) -> Result<(), ManagementError> {
        self.wait_turn().await;
        self.inner.create_temp_bulk(index_name, items).await
    }

    async fn replace_index(&self, index_name: &str) -> Result<(), ManagementError> {
        self.wait_turn().await;
        self.inner.replace_index(index_name).await
    }

    async fn create_item(&self, index_name: &str, data: &Value) -> Result<(), ManagementError> {
        self.wait_turn().await;
        self.inner.create_item(index_name, data).await
    }

    async fn update_item(
        &self,
        index_name: &str,
        item_id: &str,
        data: &Value,
    ) -> Result<(), ManagementError> {
        self.wait_turn().await;
        self.inner.update_item(index_name, item_id, data).await
    }

    async fn delete_item(&self, index_name: &str, item_id: &str) -> Result<(), ManagementError> {
        self.wait_turn().await;
        self.inner.delete_item(index_name, item_id).await
    }
}
