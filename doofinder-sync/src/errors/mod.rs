//! Error types for the Doofinder sync.
//!
//! Indexing operations themselves never fail with these: they report an
//! `ApiStatus`. These errors cover everything around a run (configuration,
//! feed loading, local state).

use thiserror::Error;

/// Errors that can occur while preparing or finishing an indexing run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The feed could not be read or parsed.
    #[error("Feed error: {0}")]
    FeedError(String),

    /// The last-modified store could not be read or written.
    #[error("Store error: {0}")]
    StoreError(String),

    /// The run finished with failed item types.
    #[error("Run failed: {0}")]
    RunFailed(String),
}

impl SyncError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a feed error.
    pub fn feed(msg: impl Into<String>) -> Self {
        Self::FeedError(msg.into())
    }

    /// Create a store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    /// Create a run failure.
    pub fn run_failed(msg: impl Into<String>) -> Self {
        Self::RunFailed(msg.into())
    }
}
