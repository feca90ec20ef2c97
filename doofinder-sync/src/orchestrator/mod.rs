//! Orchestrator for an indexing run.
//!
//! Uploads every item type of a feed into its temporary index and commits
//! the types whose upload completed.

use std::fmt;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use doofinder_sync_shared::{ApiStatus, ItemType};

use crate::config::DEFAULT_BATCH_SIZE;
use crate::feed::Feed;
use crate::indexer::{DoofinderApi, TempIndexRegistry};

/// Configuration for an indexing job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Maximum number of items per uploaded batch.
    pub batch_size: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Step of a type's indexing at which it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Replace,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Replace => f.write_str("replace"),
        }
    }
}

/// Outcome of one item type in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOutcome {
    /// All batches were uploaded and the production index replaced.
    Replaced { batches: usize, items: usize },
    /// The type had no items; its index was left untouched.
    Skipped,
    /// The type failed; its production index was not replaced.
    Failed {
        status: ApiStatus,
        stage: Stage,
        batches_sent: usize,
    },
}

impl TypeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Summary of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub outcomes: Vec<(ItemType, TypeOutcome)>,
    /// Remote calls issued by the wrapper when the run finished.
    pub api_calls: u64,
}

impl RunReport {
    /// Whether no item type failed.
    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(|(_, outcome)| outcome.is_failure())
    }

    pub fn failed_types(&self) -> Vec<&ItemType> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .map(|(item_type, _)| item_type)
            .collect()
    }

    pub fn outcome(&self, item_type: &ItemType) -> Option<&TypeOutcome> {
        self.outcomes
            .iter()
            .find(|(t, _)| t == item_type)
            .map(|(_, outcome)| outcome)
    }

    /// Log one line per item type and a summary.
    pub fn log(&self) {
        for (item_type, outcome) in &self.outcomes {
            match outcome {
                TypeOutcome::Replaced { batches, items } => info!(
                    run_id = %self.run_id,
                    item_type = %item_type,
                    batches,
                    items,
                    "Index replaced"
                ),
                TypeOutcome::Skipped => info!(
                    run_id = %self.run_id,
                    item_type = %item_type,
                    "No items, index left untouched"
                ),
                TypeOutcome::Failed {
                    status,
                    stage,
                    batches_sent,
                } => error!(
                    run_id = %self.run_id,
                    item_type = %item_type,
                    status = %status,
                    stage = %stage,
                    batches_sent,
                    "Item type failed"
                ),
            }
        }

        info!(
            run_id = %self.run_id,
            item_types = self.outcomes.len(),
            failed = self.failed_types().len(),
            api_calls = self.api_calls,
            "Indexing run finished"
        );
    }
}

/// Drives indexing runs through a [`DoofinderApi`].
pub struct IndexingJob {
    api: DoofinderApi,
    config: JobConfig,
}

impl IndexingJob {
    /// Create a new job with default configuration.
    pub fn new(api: DoofinderApi) -> Self {
        Self::with_config(api, JobConfig::default())
    }

    /// Create a new job with custom configuration.
    pub fn with_config(api: DoofinderApi, config: JobConfig) -> Self {
        Self { api, config }
    }

    pub fn api(&self) -> &DoofinderApi {
        &self.api
    }

    /// Index every item type of `feed`.
    ///
    /// Each type is uploaded in batches and committed only when all of its
    /// batches succeeded. A failed type does not stop the others.
    #[instrument(skip(self, feed), fields(item_types = feed.len()))]
    pub async fn run(&self, feed: &Feed) -> RunReport {
        let run_id = Uuid::new_v4();
        let mut registry = TempIndexRegistry::new();
        let mut outcomes = Vec::with_capacity(feed.len());

        info!(
            run_id = %run_id,
            items = feed.item_count(),
            batch_size = self.config.batch_size,
            "Starting indexing run"
        );

        let engine_status = self.api.search_engine_status();
        if !engine_status.is_success() {
            warn!(status = %engine_status, "Search engine unavailable, every item type will fail");
        }

        for (item_type, items) in feed.iter() {
            let outcome = self.index_type(&mut registry, item_type, items).await;
            outcomes.push((item_type.clone(), outcome));
        }

        RunReport {
            run_id,
            outcomes,
            api_calls: self.api.api_calls(),
        }
    }

    async fn index_type(
        &self,
        registry: &mut TempIndexRegistry,
        item_type: &ItemType,
        items: &[serde_json::Value],
    ) -> TypeOutcome {
        if items.is_empty() {
            return TypeOutcome::Skipped;
        }

        let mut batches_sent = 0;
        for batch in items.chunks(self.config.batch_size.max(1)) {
            let status = self.api.send_batch(registry, item_type, batch).await;
            if !status.is_success() {
                return TypeOutcome::Failed {
                    status,
                    stage: Stage::Upload,
                    batches_sent,
                };
            }
            batches_sent += 1;
        }

        match self.api.replace_index(registry, item_type.index_name()).await {
            ApiStatus::Success => TypeOutcome::Replaced {
                batches: batches_sent,
                items: items.len(),
            },
            status => TypeOutcome::Failed {
                status,
                stage: Stage::Replace,
                batches_sent,
            },
        }
    }
}
