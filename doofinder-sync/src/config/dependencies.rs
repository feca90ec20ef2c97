//! Dependency initialization and wiring for the Doofinder sync.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::SyncConfig;
use crate::errors::SyncError;
use crate::indexer::DoofinderApi;
use crate::last_modified::{FileLastModifiedStore, LastModifiedStore};
use crate::orchestrator::{IndexingJob, JobConfig};

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub config: SyncConfig,
    /// The configured job ready to run.
    pub job: IndexingJob,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`SyncConfig::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(SyncError)` - If the configuration or the last-modified store is invalid
    pub async fn new() -> Result<Self, SyncError> {
        let config = SyncConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Initialize all dependencies from an explicit configuration.
    pub async fn from_config(config: SyncConfig) -> Result<Self, SyncError> {
        info!(
            api_host = config.api_host.as_deref().unwrap_or("<unset>"),
            language = config.language.as_deref().unwrap_or("<default>"),
            disable_api = config.disable_api,
            min_call_interval_ms = config.min_call_interval.as_millis() as u64,
            batch_size = config.batch_size,
            "Initializing dependencies"
        );

        let store: Arc<dyn LastModifiedStore> =
            Arc::new(FileLastModifiedStore::open(&config.last_modified_path)?);

        let api = DoofinderApi::connect(&config, config.language.clone(), store).await;

        let status = api.search_engine_status();
        if status.is_success() {
            info!("Doofinder API ready");
        } else {
            error!(status = %status, "Doofinder search engine is not available");
        }

        let job = IndexingJob::with_config(
            api,
            JobConfig {
                batch_size: config.batch_size,
            },
        );

        Ok(Self { config, job })
    }
}
