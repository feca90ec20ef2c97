//! Environment configuration for the Doofinder sync.

mod dependencies;

pub use dependencies::Dependencies;

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use doofinder_sync_repository::config::{DEFAULT_MIN_CALL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
use doofinder_sync_repository::ManagementConfig;
use tracing::warn;

use crate::errors::SyncError;

/// Default number of items per uploaded batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default location of the feed file.
const DEFAULT_FEED_PATH: &str = "feed.json";

/// Default location of the last-modified file.
const DEFAULT_LAST_MODIFIED_PATH: &str = "last_modified.json";

const HASH_VAR: &str = "DOOFINDER_SEARCH_ENGINE_HASH";

/// Credentials of one search engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_host: String,
    pub search_engine_hash: String,
}

/// Settings of the sync binary.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    /// Hash used when no language-specific hash is configured.
    pub search_engine_hash: Option<String>,
    /// Search engine hashes by lowercase language code.
    pub language_hashes: HashMap<String, String>,
    pub language: Option<String>,
    pub disable_api: bool,
    pub min_call_interval: Duration,
    pub request_timeout: Duration,
    pub batch_size: usize,
    pub feed_path: PathBuf,
    pub last_modified_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: None,
            search_engine_hash: None,
            language_hashes: HashMap::new(),
            language: None,
            disable_api: false,
            min_call_interval: DEFAULT_MIN_CALL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            batch_size: DEFAULT_BATCH_SIZE,
            feed_path: PathBuf::from(DEFAULT_FEED_PATH),
            last_modified_path: PathBuf::from(DEFAULT_LAST_MODIFIED_PATH),
        }
    }
}

impl SyncConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `DOOFINDER_API_KEY`: Management API key
    /// - `DOOFINDER_API_HOST`: Management API host, e.g. `eu1-api.doofinder.com`
    /// - `DOOFINDER_SEARCH_ENGINE_HASH`: Default search engine hash
    /// - `DOOFINDER_SEARCH_ENGINE_HASH_<LANG>`: Search engine hash for a language
    /// - `DOOFINDER_LANGUAGE`: Language context of the run (default: none)
    /// - `DOOFINDER_DISABLE_API`: Skip all remote calls (default: false)
    /// - `DOOFINDER_MIN_CALL_INTERVAL_MS`: Spacing between calls (default: 500)
    /// - `DOOFINDER_REQUEST_TIMEOUT_SECS`: HTTP timeout (default: 30)
    /// - `DOOFINDER_BATCH_SIZE`: Items per batch (default: 100)
    /// - `DOOFINDER_FEED_PATH`: Feed file (default: feed.json)
    /// - `DOOFINDER_LAST_MODIFIED_PATH`: Last-modified file (default: last_modified.json)
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_vars(env::vars())
    }

    /// Build the configuration from `(name, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();
        let get = |name: &str| vars.get(name).map(|value| value.trim().to_string());

        let mut config = Self {
            api_key: get("DOOFINDER_API_KEY"),
            api_host: get("DOOFINDER_API_HOST"),
            search_engine_hash: get(HASH_VAR),
            language: get("DOOFINDER_LANGUAGE"),
            ..Self::default()
        };

        let prefix = format!("{}_", HASH_VAR);
        for (name, value) in &vars {
            match name.strip_prefix(&prefix) {
                Some(lang) if is_language_code(lang) => {
                    config
                        .language_hashes
                        .insert(lang.to_lowercase(), value.trim().to_string());
                }
                Some(suffix) => {
                    warn!(
                        variable = %name,
                        suffix,
                        "Ignoring hash variable without a language code"
                    );
                }
                None => {}
            }
        }

        if let Some(value) = get("DOOFINDER_DISABLE_API") {
            config.disable_api = parse_bool("DOOFINDER_DISABLE_API", &value)?;
        }
        if let Some(ms) = parse_number::<u64>(&vars, "DOOFINDER_MIN_CALL_INTERVAL_MS")? {
            config.min_call_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_number::<u64>(&vars, "DOOFINDER_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = parse_number::<usize>(&vars, "DOOFINDER_BATCH_SIZE")? {
            if size == 0 {
                warn!("DOOFINDER_BATCH_SIZE is 0, using {}", DEFAULT_BATCH_SIZE);
            } else {
                config.batch_size = size;
            }
        }
        if let Some(path) = get("DOOFINDER_FEED_PATH") {
            config.feed_path = PathBuf::from(path);
        }
        if let Some(path) = get("DOOFINDER_LAST_MODIFIED_PATH") {
            config.last_modified_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Credentials for `language`, or `None` when any of them is missing.
    ///
    /// A language-specific hash wins over the default one.
    pub fn credentials(&self, language: Option<&str>) -> Option<Credentials> {
        let hash = language
            .and_then(|lang| self.language_hashes.get(&lang.to_lowercase()))
            .or(self.search_engine_hash.as_ref())?;

        Some(Credentials {
            api_key: self.api_key.clone()?,
            api_host: self.api_host.clone()?,
            search_engine_hash: hash.clone(),
        })
    }

    /// Management client settings for `language`.
    pub fn management_config(&self, language: Option<&str>) -> Option<ManagementConfig> {
        let credentials = self.credentials(language)?;
        Some(
            ManagementConfig::new(
                credentials.api_host,
                credentials.api_key,
                credentials.search_engine_hash,
            )
            .with_min_call_interval(self.min_call_interval)
            .with_request_timeout(self.request_timeout),
        )
    }
}

/// Language codes look like `en`, `ast` or `pt_BR`.
fn is_language_code(code: &str) -> bool {
    let mut parts = code.split('_');
    let alphabetic = |part: &str| part.chars().all(|c| c.is_ascii_alphabetic());

    let language_ok = parts
        .next()
        .is_some_and(|lang| (2..=3).contains(&lang.len()) && alphabetic(lang));
    let region_ok = match parts.next() {
        None => true,
        Some(region) => region.len() == 2 && alphabetic(region),
    };

    language_ok && region_ok && parts.next().is_none()
}

fn parse_bool(name: &str, value: &str) -> Result<bool, SyncError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SyncError::config(format!("{} must be a boolean, got '{}'", name, value))),
    }
}

fn parse_number<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, SyncError> {
    match vars.get(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| SyncError::config(format!("{} must be a number, got '{}'", name, value))),
    }
}
