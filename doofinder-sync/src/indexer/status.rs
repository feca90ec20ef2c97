//! Translation of management API errors into caller-facing status codes.

use doofinder_sync_repository::ManagementError;
use doofinder_sync_shared::ApiStatus;

/// Messages the provider sends when the API key is rejected.
const NOT_AUTHENTICATED_PATTERNS: &[&str] = &[
    "invalid token",
    "expired token",
    "token has expired",
    "invalid api key",
    "authentication credentials",
    "not authenticated",
];

/// Messages the provider sends when the search engine hash is wrong.
const INVALID_SEARCH_ENGINE_PATTERNS: &[&str] = &[
    "search engine not found",
    "searchengine not found",
    "invalid search engine",
    "search engine does not exist",
];

/// Messages for requests the provider refuses on their content or quota.
const BAD_REQUEST_PATTERNS: &[&str] = &[
    "quota exceeded",
    "limit exceeded",
    "too many items",
    "validation error",
    "invalid json",
];

/// Recognize a provider-specific status from an error message and body.
///
/// Matching is case-insensitive. Returns `None` when nothing is recognized.
pub fn recognize(message: &str, body: Option<&str>) -> Option<ApiStatus> {
    let haystack = format!("{} {}", message, body.unwrap_or_default()).to_lowercase();
    let matches_any = |patterns: &[&str]| patterns.iter().any(|p| haystack.contains(p));

    if matches_any(NOT_AUTHENTICATED_PATTERNS) {
        Some(ApiStatus::NotAuthenticated)
    } else if matches_any(INVALID_SEARCH_ENGINE_PATTERNS) {
        Some(ApiStatus::InvalidSearchEngine)
    } else if matches_any(BAD_REQUEST_PATTERNS) {
        Some(ApiStatus::BadRequest)
    } else {
        None
    }
}

/// Map a management API error to the status reported to callers.
///
/// Rejected credentials always map to `NotAuthenticated`. Other remote
/// errors are matched against known provider messages. Everything else,
/// including local transport failures, is `UnknownError`.
pub fn translate(error: &ManagementError) -> ApiStatus {
    match error {
        ManagementError::NotAllowed { .. } => ApiStatus::NotAuthenticated,
        e if e.is_remote() => recognize(e.message(), e.body()).unwrap_or(ApiStatus::UnknownError),
        _ => ApiStatus::UnknownError,
    }
}
