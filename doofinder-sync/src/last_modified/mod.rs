//! Last-modified tracking per language context.
//!
//! Every successful change pushed to Doofinder records a timestamp so the
//! site can tell when its index content last changed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::errors::SyncError;

/// Key used when no language context is set.
pub const DEFAULT_LANGUAGE_KEY: &str = "default";

fn language_key(language: Option<&str>) -> String {
    match language {
        Some(lang) if !lang.trim().is_empty() => lang.trim().to_lowercase(),
        _ => DEFAULT_LANGUAGE_KEY.to_string(),
    }
}

/// Records the time of the last index change for a language context.
pub trait LastModifiedStore: Send + Sync {
    /// Record `at` as the last modification of `language`.
    fn set_last_modified(&self, language: Option<&str>, at: DateTime<Utc>)
        -> Result<(), SyncError>;

    /// Last recorded modification of `language`, if any.
    fn last_modified(&self, language: Option<&str>) -> Option<DateTime<Utc>>;
}

/// Store kept in memory only.
#[derive(Debug, Default)]
pub struct InMemoryLastModifiedStore {
    entries: RwLock<BTreeMap<String, DateTime<Utc>>>,
}

impl InMemoryLastModifiedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LastModifiedStore for InMemoryLastModifiedStore {
    fn set_last_modified(
        &self,
        language: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SyncError::store("last-modified lock poisoned"))?;
        entries.insert(language_key(language), at);
        Ok(())
    }

    fn last_modified(&self, language: Option<&str>) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&language_key(language)).copied())
    }
}

/// Store persisted as a JSON object of `language -> RFC 3339 timestamp`.
///
/// The whole file is rewritten on every update.
#[derive(Debug)]
pub struct FileLastModifiedStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, DateTime<Utc>>>,
}

impl FileLastModifiedStore {
    /// Open the store at `path`, loading existing entries.
    ///
    /// A missing file is treated as an empty store and created on first update.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref().to_path_buf();

        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                SyncError::store(format!("Invalid last-modified file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(SyncError::store(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened last-modified store");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LastModifiedStore for FileLastModifiedStore {
    fn set_last_modified(
        &self,
        language: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SyncError::store("last-modified lock poisoned"))?;
        entries.insert(language_key(language), at);

        let text = serde_json::to_string_pretty(&*entries)
            .map_err(|e| SyncError::store(e.to_string()))?;
        std::fs::write(&self.path, text).map_err(|e| {
            SyncError::store(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }

    fn last_modified(&self, language: Option<&str>) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&language_key(language)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_in_memory_keys_by_language() {
        let store = InMemoryLastModifiedStore::new();
        store.set_last_modified(Some("en"), at(10)).unwrap();
        store.set_last_modified(None, at(20)).unwrap();

        assert_eq!(store.last_modified(Some("en")), Some(at(10)));
        assert_eq!(store.last_modified(Some("EN")), Some(at(10)));
        assert_eq!(store.last_modified(None), Some(at(20)));
        assert_eq!(store.last_modified(Some("es")), None);
    }

    #[test]
    fn test_empty_language_is_default() {
        let store = InMemoryLastModifiedStore::new();
        store.set_last_modified(Some(" "), at(5)).unwrap();
        assert_eq!(store.last_modified(None), Some(at(5)));
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_modified.json");

        let store = FileLastModifiedStore::open(&path).unwrap();
        assert_eq!(store.last_modified(None), None);
        store.set_last_modified(Some("fr"), at(1_700_000_000)).unwrap();
        drop(store);

        let reopened = FileLastModifiedStore::open(&path).unwrap();
        assert_eq!(reopened.last_modified(Some("fr")), Some(at(1_700_000_000)));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_modified.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileLastModifiedStore::open(&path),
            Err(SyncError::StoreError(_))
        ));
    }
}
