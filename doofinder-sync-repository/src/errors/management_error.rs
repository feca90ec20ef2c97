//! Management API error types.
//!
//! This module defines the tagged error returned by every management API
//! operation. The indexer inspects the variant to tell recoverable signals
//! (`NotFound`, `BadRequest`) apart from terminal failures.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by the Doofinder management API.
///
/// Remote variants keep the raw response body so callers can log it and
/// match provider-specific messages against it.
#[derive(Debug, Clone, Error)]
pub enum ManagementError {
    /// The referenced search engine, index or item does not exist.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        body: Option<String>,
    },

    /// The request was malformed or its target is missing.
    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        body: Option<String>,
    },

    /// The credentials were rejected.
    #[error("Not allowed: {message}")]
    NotAllowed {
        message: String,
        body: Option<String>,
    },

    /// The provider rate limit was hit.
    #[error("Too many requests: {message}")]
    TooManyRequests {
        message: String,
        body: Option<String>,
    },

    /// Any other non-success response.
    #[error("Remote error ({status}): {message}")]
    Remote {
        status: u16,
        message: String,
        body: Option<String>,
    },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The client could not be built from its configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ManagementError {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            message: msg.into(),
            body: None,
        }
    }

    /// Create a bad request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest {
            message: msg.into(),
            body: None,
        }
    }

    /// Create a not allowed error.
    pub fn not_allowed(msg: impl Into<String>) -> Self {
        Self::NotAllowed {
            message: msg.into(),
            body: None,
        }
    }

    /// Create a too many requests error.
    pub fn too_many_requests(msg: impl Into<String>) -> Self {
        Self::TooManyRequests {
            message: msg.into(),
            body: None,
        }
    }

    /// Create a remote error for an unmapped status code.
    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: msg.into(),
            body: None,
        }
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Attach a raw response body to a remote error.
    ///
    /// Local variants (transport, serialization, configuration) have no body
    /// and are returned unchanged.
    pub fn with_body(mut self, raw: impl Into<String>) -> Self {
        match &mut self {
            Self::NotFound { body, .. }
            | Self::BadRequest { body, .. }
            | Self::NotAllowed { body, .. }
            | Self::TooManyRequests { body, .. }
            | Self::Remote { body, .. } => *body = Some(raw.into()),
            Self::Transport(_) | Self::Serialization(_) | Self::Configuration(_) => {}
        }
        self
    }

    /// Map a non-success HTTP response to an error variant.
    ///
    /// The message is taken from the JSON body when the provider sent one,
    /// and falls back to the status code otherwise.
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = extract_message(&body).unwrap_or_else(|| format!("HTTP {}", status));

        let error = match status {
            400 | 422 => Self::bad_request(message),
            401 | 403 => Self::not_allowed(message),
            404 => Self::not_found(message),
            429 => Self::too_many_requests(message),
            _ => Self::remote(status, message),
        };

        if body.is_empty() {
            error
        } else {
            error.with_body(body)
        }
    }

    /// Human readable message of the error.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message, .. }
            | Self::BadRequest { message, .. }
            | Self::NotAllowed { message, .. }
            | Self::TooManyRequests { message, .. }
            | Self::Remote { message, .. } => message,
            Self::Transport(message)
            | Self::Serialization(message)
            | Self::Configuration(message) => message,
        }
    }

    /// Raw response body, when the error came from the remote service.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::NotFound { body, .. }
            | Self::BadRequest { body, .. }
            | Self::NotAllowed { body, .. }
            | Self::TooManyRequests { body, .. }
            | Self::Remote { body, .. } => body.as_deref(),
            Self::Transport(_) | Self::Serialization(_) | Self::Configuration(_) => None,
        }
    }

    /// Whether the error was reported by the remote service.
    pub fn is_remote(&self) -> bool {
        !matches!(
            self,
            Self::Transport(_) | Self::Serialization(_) | Self::Configuration(_)
        )
    }
}

impl From<serde_json::Error> for ManagementError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Pull the provider message out of an error body.
///
/// Doofinder answers with `{"error": {"message": ...}}`; older endpoints use
/// a top-level `message` or `detail` field.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    let candidates = [
        value.pointer("/error/message"),
        value.get("message"),
        value.get("detail"),
        value.get("error"),
    ];

    let message = candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(str::to_string));
    message
}
