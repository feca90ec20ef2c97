//! Doofinder indexing wrapper.
//!
//! `DoofinderApi` sits between the indexing job and the management API. It
//! creates temporary indices on demand, uploads batches into them, keeps
//! single items in sync and commits a type by replacing its production
//! index. Remote failures never escape this layer: every operation reports
//! an [`ApiStatus`].

pub mod registry;
pub mod status;

pub use registry::TempIndexRegistry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use doofinder_sync_repository::{
    CreateIndexRequest, ManagementApi, ManagementClient, ManagementError, SearchEngine, Throttle,
};
use doofinder_sync_shared::{ApiStatus, ItemType};

use crate::config::SyncConfig;
use crate::last_modified::LastModifiedStore;

/// Per-wrapper settings that do not come from credentials.
#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    /// Language context of the search engine, if any.
    pub language: Option<String>,
    /// Skip every remote call and report success instead.
    pub disable_api: bool,
}

impl ApiSettings {
    pub fn new(language: Option<String>) -> Self {
        Self {
            language,
            disable_api: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disable_api = true;
        self
    }
}

/// State of the search engine handle.
enum Connection {
    /// The engine was fetched; calls go through `client`.
    Live {
        client: Box<dyn ManagementApi>,
        engine: SearchEngine,
    },
    /// The API is disabled: calls are skipped and reported as successful.
    Simulated,
    /// No usable engine. Every operation returns the recorded status.
    Unavailable(ApiStatus),
}

/// Management API wrapper reporting status codes.
///
/// # Example
///
/// ```ignore
/// let api = DoofinderApi::connect(&config, Some("en".into()), store).await;
/// let mut registry = TempIndexRegistry::new();
///
/// let status = api.send_batch(&mut registry, &ItemType::new("product"), &items).await;
/// if status.is_success() {
///     api.replace_index(&mut registry, "product").await;
/// }
/// ```
pub struct DoofinderApi {
    connection: Connection,
    language: Option<String>,
    last_modified: Arc<dyn LastModifiedStore>,
    api_calls: AtomicU64,
}

impl DoofinderApi {
    /// Connect to the search engine configured for `language`.
    ///
    /// Never fails: a missing or rejected configuration is recorded as the
    /// status returned by every later operation.
    pub async fn connect(
        config: &SyncConfig,
        language: Option<String>,
        last_modified: Arc<dyn LastModifiedStore>,
    ) -> Self {
        let settings = ApiSettings {
            language,
            disable_api: config.disable_api,
        };

        let Some(management_config) = config.management_config(settings.language.as_deref())
        else {
            error!(
                language = ?settings.language,
                "Doofinder credentials are incomplete (api key, api host or search engine hash)"
            );
            return Self::unavailable(settings, ApiStatus::UnknownError, last_modified);
        };

        let client = match ManagementClient::new(&management_config) {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "Failed to create Doofinder management client");
                return Self::unavailable(settings, ApiStatus::UnknownError, last_modified);
            }
        };

        let throttled = Throttle::new(client, management_config.min_call_interval);
        Self::with_client(Box::new(throttled), settings, last_modified).await
    }

    /// Build the wrapper around an existing client.
    ///
    /// Fetches the search engine unless the API is disabled.
    pub async fn with_client(
        client: Box<dyn ManagementApi>,
        settings: ApiSettings,
        last_modified: Arc<dyn LastModifiedStore>,
    ) -> Self {
        let api_calls = AtomicU64::new(0);

        let connection = if settings.disable_api {
            warn!("Doofinder API is disabled, remote calls will be skipped");
            Connection::Simulated
        } else {
            api_calls.fetch_add(1, Ordering::Relaxed);
            match client.get_search_engine().await {
                Ok(Some(engine)) => {
                    info!(
                        hash = %engine.hash,
                        name = %engine.name,
                        indices = engine.indices.len(),
                        "Search engine available"
                    );
                    Connection::Live { client, engine }
                }
                Ok(None) => {
                    error!("Search engine not returned by the management API");
                    Connection::Unavailable(ApiStatus::InvalidSearchEngine)
                }
                Err(ManagementError::NotFound { message, .. }) => {
                    error!(error = %message, "Invalid search engine");
                    Connection::Unavailable(ApiStatus::InvalidSearchEngine)
                }
                Err(ManagementError::NotAllowed { message, .. }) => {
                    error!(error = %message, "Management API key rejected");
                    Connection::Unavailable(ApiStatus::NotAuthenticated)
                }
                Err(e) => {
                    error!(error = %e, "Failed to fetch search engine");
                    Connection::Unavailable(ApiStatus::UnknownError)
                }
            }
        };

        Self {
            connection,
            language: settings.language,
            last_modified,
            api_calls,
        }
    }

    fn unavailable(
        settings: ApiSettings,
        status: ApiStatus,
        last_modified: Arc<dyn LastModifiedStore>,
    ) -> Self {
        Self {
            connection: Connection::Unavailable(status),
            language: settings.language,
            last_modified,
            api_calls: AtomicU64::new(0),
        }
    }

    /// Number of remote calls issued so far.
    pub fn api_calls(&self) -> u64 {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// `Success` when operations may proceed, the recorded failure otherwise.
    pub fn search_engine_status(&self) -> ApiStatus {
        match &self.connection {
            Connection::Live { .. } | Connection::Simulated => ApiStatus::Success,
            Connection::Unavailable(status) => *status,
        }
    }

    /// The fetched search engine, if connected to a live API.
    pub fn search_engine(&self) -> Option<&SearchEngine> {
        match &self.connection {
            Connection::Live { engine, .. } => Some(engine),
            _ => None,
        }
    }

    pub fn is_api_disabled(&self) -> bool {
        matches!(self.connection, Connection::Simulated)
    }

    /// Resolve the client for `operation`.
    ///
    /// `Ok(None)` means the API is disabled and the call must be skipped.
    fn client(&self, operation: &'static str) -> Result<Option<&dyn ManagementApi>, ApiStatus> {
        match &self.connection {
            Connection::Live { client, .. } => Ok(Some(client.as_ref())),
            Connection::Simulated => {
                info!(operation, "Doofinder API disabled, skipping call");
                Ok(None)
            }
            Connection::Unavailable(status) => {
                warn!(operation, status = %status, "No valid search engine, skipping call");
                Err(*status)
            }
        }
    }

    fn count_call(&self, operation: &'static str) {
        let total = self.api_calls.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(operation, api_calls = total, "Management API call");
    }

    fn touch(&self, at: DateTime<Utc>) {
        if let Err(e) = self
            .last_modified
            .set_last_modified(self.language.as_deref(), at)
        {
            warn!(error = %e, "Failed to record last modification");
        }
    }

    /// Upload a batch of items into the temporary index of `item_type`.
    ///
    /// The first batch of a type in a run creates the temporary index. When
    /// the production index does not exist yet it is created first and the
    /// temporary index is created again, once.
    #[instrument(skip(self, registry, items), fields(item_type = %item_type, items = items.len()))]
    pub async fn send_batch(
        &self,
        registry: &mut TempIndexRegistry,
        item_type: &ItemType,
        items: &[Value],
    ) -> ApiStatus {
        let client = match self.client("send_batch") {
            Ok(Some(client)) => client,
            Ok(None) => {
                registry.mark(item_type.clone());
                return ApiStatus::Success;
            }
            Err(status) => return status,
        };

        if !registry.has(item_type) {
            match self.ensure_temp_index(client, item_type).await {
                Ok(true) => registry.mark(item_type.clone()),
                Ok(false) => {}
                Err(status) => return status,
            }
        }

        self.count_call("create_temp_bulk");
        let status = match client
            .create_temp_bulk(item_type.index_name(), items)
            .await
        {
            Ok(()) => ApiStatus::Success,
            Err(e) => {
                let status = status::translate(&e);
                error!(
                    error = %e,
                    body = e.body().unwrap_or_default(),
                    status = %status,
                    "Bulk upload to temporary index failed"
                );
                status
            }
        };

        info!(status = %status, api_calls = self.api_calls(), "Batch sent");
        status
    }

    /// Create the temporary index of `item_type`.
    ///
    /// Returns whether the temporary index is known to exist. Failures other
    /// than a missing production index are tolerated, the index usually
    /// exists already.
    async fn ensure_temp_index(
        &self,
        client: &dyn ManagementApi,
        item_type: &ItemType,
    ) -> Result<bool, ApiStatus> {
        let index = item_type.index_name();

        self.count_call("create_temporary_index");
        match client.create_temporary_index(index).await {
            Ok(()) => {
                debug!(index, "Temporary index created");
                Ok(true)
            }
            Err(ManagementError::NotFound { message, .. }) => {
                info!(index, reason = %message, "Index missing, creating it");

                self.count_call("create_index");
                if let Err(e) = client.create_index(&CreateIndexRequest::generic(index)).await {
                    error!(index, error = %e, "Failed to create index");
                    return Err(ApiStatus::UnknownError);
                }

                self.count_call("create_temporary_index");
                match client.create_temporary_index(index).await {
                    Ok(()) => Ok(true),
                    Err(e) => {
                        error!(index, error = %e, "Failed to create temporary index after creating index");
                        Err(ApiStatus::UnknownError)
                    }
                }
            }
            Err(e) => {
                warn!(index, error = %e, "Temporary index not created, continuing");
                Ok(false)
            }
        }
    }

    /// Update a single item, creating it when the update is rejected.
    #[instrument(skip(self, data), fields(item_type = %item_type))]
    pub async fn update_item(
        &self,
        item_type: &ItemType,
        item_id: &str,
        data: &Value,
        update_time: Option<DateTime<Utc>>,
    ) -> ApiStatus {
        let client = match self.client("update_item") {
            Ok(Some(client)) => client,
            Ok(None) => {
                self.touch(update_time.unwrap_or_else(Utc::now));
                return ApiStatus::Success;
            }
            Err(status) => return status,
        };

        let index = item_type.index_name();

        self.count_call("update_item");
        let status = match client.update_item(index, item_id, data).await {
            Ok(()) => ApiStatus::Success,
            Err(ManagementError::BadRequest { message, .. }) => {
                debug!(reason = %message, "Update rejected, creating item");
                self.maybe_create_index(client, item_type).await;

                self.count_call("create_item");
                match client.create_item(index, data).await {
                    Ok(()) => ApiStatus::Success,
                    Err(e) => {
                        error!(error = %e, "Failed to create item");
                        ApiStatus::BadRequest
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to update item");
                ApiStatus::UnknownError
            }
        };

        if status.is_success() {
            self.touch(update_time.unwrap_or_else(Utc::now));
        }
        status
    }

    /// Create the production index of `item_type` when it is not listed.
    ///
    /// Failures are logged and ignored: item creation reports the outcome.
    async fn maybe_create_index(&self, client: &dyn ManagementApi, item_type: &ItemType) {
        let index = item_type.index_name();

        self.count_call("list_indices");
        let indices = match client.list_indices().await {
            Ok(indices) => indices,
            Err(e) => {
                warn!(error = %e, "Failed to list indices");
                Vec::new()
            }
        };

        if indices.iter().any(|summary| summary.name == index) {
            return;
        }

        let request = CreateIndexRequest::for_language(index, self.language.clone());
        info!(index, request = ?request, "Creating missing index");

        self.count_call("create_index");
        if let Err(e) = client.create_index(&request).await {
            warn!(index, error = %e, "Failed to create index");
        }
    }

    /// Delete a single item.
    #[instrument(skip(self), fields(item_type = %item_type))]
    pub async fn remove_item(
        &self,
        item_type: &ItemType,
        item_id: &str,
        update_time: Option<DateTime<Utc>>,
    ) -> ApiStatus {
        let client = match self.client("remove_item") {
            Ok(Some(client)) => client,
            Ok(None) => {
                self.touch(update_time.unwrap_or_else(Utc::now));
                return ApiStatus::Success;
            }
            Err(status) => return status,
        };

        self.count_call("delete_item");
        match client.delete_item(item_type.index_name(), item_id).await {
            Ok(()) => {
                self.touch(update_time.unwrap_or_else(Utc::now));
                ApiStatus::Success
            }
            Err(e) => {
                error!(error = %e, "Failed to delete item");
                ApiStatus::UnknownError
            }
        }
    }

    /// Replace the production index with its temporary counterpart.
    ///
    /// The registry is cleared before anything else, so the next run checks
    /// every temporary index again whatever the outcome.
    #[instrument(skip(self, registry))]
    pub async fn replace_index(
        &self,
        registry: &mut TempIndexRegistry,
        index_name: &str,
    ) -> ApiStatus {
        registry.clear_all();

        let client = match self.client("replace_index") {
            Ok(Some(client)) => client,
            Ok(None) => {
                self.touch(Utc::now());
                return ApiStatus::Success;
            }
            Err(status) => return status,
        };

        self.count_call("replace_index");
        let status = match client.replace_index(index_name).await {
            Ok(()) => {
                self.touch(Utc::now());
                ApiStatus::Success
            }
            Err(e) => {
                error!(error = %e, body = e.body().unwrap_or_default(), "Index replace failed");
                ApiStatus::UnknownError
            }
        };

        info!(status = %status, api_calls = self.api_calls(), "Replace finished");
        status
    }
}
