//! Feed of items to index, grouped by item type.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use doofinder_sync_shared::ItemType;

use crate::errors::SyncError;

/// Items of one run, keyed by item type.
///
/// The JSON form is an object mapping each item type to an array of items:
///
/// ```json
/// { "product": [{ "id": "1", "title": "Shirt" }], "post": [] }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    items: BTreeMap<ItemType, Vec<Value>>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a feed from its JSON form.
    pub fn from_json_str(text: &str) -> Result<Self, SyncError> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| SyncError::feed(format!("Invalid feed JSON: {}", e)))?;

        let Value::Object(map) = root else {
            return Err(SyncError::feed("Feed must be a JSON object"));
        };

        let mut feed = Self::new();
        for (name, value) in map {
            match value {
                Value::Array(items) => feed.insert(ItemType::new(name), items),
                _ => {
                    return Err(SyncError::feed(format!(
                        "Items of type '{}' must be an array",
                        name
                    )))
                }
            }
        }

        Ok(feed)
    }

    /// Read and parse the feed file at `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::feed(format!("Failed to read {}: {}", path.display(), e)))?;

        let feed = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            item_types = feed.len(),
            items = feed.item_count(),
            "Feed loaded"
        );
        Ok(feed)
    }

    /// Add items for `item_type`, after any already present.
    pub fn insert(&mut self, item_type: ItemType, items: Vec<Value>) {
        self.items.entry(item_type).or_default().extend(items);
    }

    /// Item types with their items, in item type order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemType, &[Value])> {
        self.items
            .iter()
            .map(|(item_type, items)| (item_type, items.as_slice()))
    }

    /// Number of item types.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items across all types.
    pub fn item_count(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }
}
