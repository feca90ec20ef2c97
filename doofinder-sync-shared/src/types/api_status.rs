//! Outcome codes reported by indexing operations.
//!
//! Callers of the indexer never see raw remote errors. Every operation
//! resolves to one of these codes, and the details only go to the logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of an indexing operation as observed by its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    /// The operation completed.
    Success,
    /// Credentials resolved but the search engine handle is unavailable.
    InvalidSearchEngine,
    /// The remote service rejected the credentials.
    NotAuthenticated,
    /// The request was malformed or its target could not be created.
    BadRequest,
    /// Anything else.
    UnknownError,
}

impl ApiStatus {
    /// The wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::InvalidSearchEngine => "invalid_search_engine",
            Self::NotAuthenticated => "not_authenticated",
            Self::BadRequest => "bad_request",
            Self::UnknownError => "unknown_error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
