//! # Doofinder Sync
//!
//! Indexes site content (posts, products, terms) into Doofinder.
//!
//! ## Architecture
//!
//! A run follows the temporary-index pattern:
//!
//! 1. **Feed**: Items to index, grouped by item type
//! 2. **Indexer**: Ensures each type has a temporary index and uploads batches into it
//! 3. **Orchestrator**: Drives a run and commits each fully uploaded type by
//!    replacing the production index with its temporary counterpart
//!
//! ## Modules
//!
//! - [`config`]: Environment configuration and dependency wiring
//! - [`errors`]: Error types for the sync binary
//! - [`feed`]: Loads the items of a run
//! - [`indexer`]: Management API wrapper reporting `ApiStatus` codes
//! - [`last_modified`]: Records when each language context last changed
//! - [`orchestrator`]: Coordinates one indexing run

pub mod config;
pub mod errors;
pub mod feed;
pub mod indexer;
pub mod last_modified;
pub mod orchestrator;

pub use config::{Credentials, Dependencies, SyncConfig};
pub use errors::SyncError;
pub use feed::Feed;
pub use indexer::{ApiSettings, DoofinderApi, TempIndexRegistry};
pub use last_modified::{FileLastModifiedStore, InMemoryLastModifiedStore, LastModifiedStore};
pub use orchestrator::{IndexingJob, JobConfig, RunReport, Stage, TypeOutcome};

pub use doofinder_sync_shared::{ApiStatus, ItemType};
