//! Item type identifiers.
//!
//! An item type is the logical category of indexed documents ("product",
//! "post", ...). Each item type maps one-to-one to a Doofinder index of the
//! same name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical document category, used verbatim as the index name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemType(String);

impl ItemType {
    /// Create a new item type.
    ///
    /// # Example
    ///
    /// ```
    /// use doofinder_sync_shared::ItemType;
    ///
    /// let products = ItemType::new("product");
    /// assert_eq!(products.index_name(), "product");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the index holding documents of this type.
    pub fn index_name(&self) -> &str {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ItemType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let item_type = ItemType::new("product");
        let json = serde_json::to_string(&item_type).unwrap();
        assert_eq!(json, "\"product\"");

        let back: ItemType = serde_json::from_str("\"post\"").unwrap();
        assert_eq!(back, ItemType::from("post"));
    }

    #[test]
    fn test_display_matches_index_name() {
        let item_type = ItemType::from("page".to_string());
        assert_eq!(item_type.to_string(), item_type.index_name());
    }
}
