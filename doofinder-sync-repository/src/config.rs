//! Configuration types for the management API client.

use std::time::Duration;

use url::Url;

use crate::errors::ManagementError;

/// Default spacing between two management API calls (2 calls per second).
pub const DEFAULT_MIN_CALL_INTERVAL: Duration = Duration::from_millis(500);

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the management API client.
///
/// Holds the credentials of one search engine plus the transport settings.
/// Use the builder methods to override the defaults.
#[derive(Debug, Clone)]
pub struct ManagementConfig {
    /// Management API host, e.g. `eu1-api.doofinder.com`. A scheme may be
    /// included; `https` is assumed otherwise.
    pub api_host: String,
    /// Management API key.
    pub api_key: String,
    /// Hash id of the search engine all calls are scoped to.
    pub search_engine_hash: String,
    /// Minimum spacing between two calls. Zero disables throttling.
    pub min_call_interval: Duration,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
}

impl ManagementConfig {
    /// Create a config with default transport settings.
    pub fn new(
        api_host: impl Into<String>,
        api_key: impl Into<String>,
        search_engine_hash: impl Into<String>,
    ) -> Self {
        Self {
            api_host: api_host.into(),
            api_key: api_key.into(),
            search_engine_hash: search_engine_hash.into(),
            min_call_interval: DEFAULT_MIN_CALL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the minimum spacing between calls.
    pub fn with_min_call_interval(mut self, interval: Duration) -> Self {
        self.min_call_interval = interval;
        self
    }

    /// Override the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// URL of the search engine resource, the root of every call.
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - e.g. `https://eu1-api.doofinder.com/api/v2/search_engines/{hash}`
    /// * `Err(ManagementError::Configuration)` - If the host or hash is unusable
    pub fn search_engine_url(&self) -> Result<Url, ManagementError> {
        if self.search_engine_hash.trim().is_empty() {
            return Err(ManagementError::configuration("search engine hash is empty"));
        }

        let host = self.api_host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(ManagementError::configuration("api host is empty"));
        }

        let base = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        let mut url = Url::parse(&base)
            .map_err(|e| ManagementError::configuration(format!("Invalid api host: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| ManagementError::configuration("api host cannot be a base URL"))?
            .clear()
            .extend(["api", "v2", "search_engines", self.search_engine_hash.as_str()]);

        Ok(url)
    }
}
