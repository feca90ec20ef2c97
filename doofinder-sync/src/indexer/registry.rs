//! Per-run record of created temporary indices.

use std::collections::BTreeSet;

use doofinder_sync_shared::ItemType;

/// Tracks which item types already got a temporary index during a run.
///
/// Owned by whoever drives the run and passed `&mut` into
/// [`DoofinderApi::send_batch`](crate::DoofinderApi::send_batch) and
/// [`DoofinderApi::replace_index`](crate::DoofinderApi::replace_index).
/// A fresh registry means every type is re-verified against the remote
/// service on its first batch.
#[derive(Debug, Clone, Default)]
pub struct TempIndexRegistry {
    created: BTreeSet<ItemType>,
}

impl TempIndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the temporary index of `item_type` was created this run.
    pub fn has(&self, item_type: &ItemType) -> bool {
        self.created.contains(item_type)
    }

    /// Record that the temporary index of `item_type` exists.
    pub fn mark(&mut self, item_type: ItemType) {
        self.created.insert(item_type);
    }

    /// Forget a single item type.
    pub fn clear(&mut self, item_type: &ItemType) {
        self.created.remove(item_type);
    }

    /// Forget every item type.
    pub fn clear_all(&mut self) {
        self.created.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    /// Marked item types, in name order.
    pub fn marked(&self) -> impl Iterator<Item = &ItemType> {
        self.created.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_has() {
        let mut registry = TempIndexRegistry::new();
        let products = ItemType::new("product");

        assert!(!registry.has(&products));
        registry.mark(products.clone());
        assert!(registry.has(&products));
        assert!(!registry.has(&ItemType::new("post")));
    }

    #[test]
    fn test_marking_twice_keeps_one_entry() {
        let mut registry = TempIndexRegistry::new();
        registry.mark(ItemType::new("product"));
        registry.mark(ItemType::new("product"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear_single_type() {
        let mut registry = TempIndexRegistry::new();
        registry.mark(ItemType::new("product"));
        registry.mark(ItemType::new("post"));

        registry.clear(&ItemType::new("product"));

        let marked: Vec<&str> = registry.marked().map(ItemType::as_str).collect();
        assert_eq!(marked, vec!["post"]);
    }

    #[test]
    fn test_clear_all() {
        let mut registry = TempIndexRegistry::new();
        registry.mark(ItemType::new("product"));
        registry.mark(ItemType::new("post"));
        registry.mark(ItemType::new("page"));

        registry.clear_all();

        assert!(registry.is_empty());
    }
}
