//! # Property Index
//!
//! Secondary index from `(key, value)` to the set of nodes holding that
//! property. The index only holds back-references; node data lives in the
//! `NodeStore`.

use crate::NodeId;
use std::collections::{BTreeMap, BTreeSet};

/// Index buckets: key -> value -> node ids.
///
/// Nesting by key first lets a lookup borrow `&str` for both halves of the
/// pair without allocating a tuple key.
#[derive(Debug, Clone, Default)]
pub struct PropertyIndex {
    buckets: BTreeMap<String, BTreeMap<String, BTreeSet<NodeId>>>,
}

impl PropertyIndex {
    /// Create a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` to the `(key, value)` bucket. Idempotent.
    pub fn index(&mut self, id: NodeId, key: &str, value: &str) {
        tracing::trace!(node = id.0, key, value, "index property");
        self.buckets
            .entry(key.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default()
            .insert(id);
    }

    /// Remove `id` from the `(key, value)` bucket. Idempotent.
    ///
    /// Empty buckets are dropped so the index does not grow with every value
    /// a key has ever held.
    pub fn unindex(&mut self, id: NodeId, key: &str, value: &str) {
        tracing::trace!(node = id.0, key, value, "unindex property");
        let Some(values) = self.buckets.get_mut(key) else {
            return;
        };
        if let Some(ids) = values.get_mut(value) {
            ids.remove(&id);
            if ids.is_empty() {
                values.remove(value);
            }
        }
        if values.is_empty() {
            self.buckets.remove(key);
        }
    }

    /// Node ids currently indexed under `(key, value)`, ascending.
    ///
    /// Ids are assigned monotonically, so ascending order is creation order.
    #[must_use]
    pub fn find(&self, key: &str, value: &str) -> Vec<NodeId> {
        self.buckets
            .get(key)
            .and_then(|values| values.get(value))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Check whether `id` is indexed under `(key, value)`.
    #[must_use]
    pub fn contains(&self, id: NodeId, key: &str, value: &str) -> bool {
        self.buckets
            .get(key)
            .and_then(|values| values.get(value))
            .is_some_and(|ids| ids.contains(&id))
    }

    /// Number of non-empty `(key, value)` buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_missing_pair_is_empty() {
        let index = PropertyIndex::new();
        assert!(index.find("type", "group").is_empty());
    }

    #[test]
    fn index_is_idempotent() {
        let mut index = PropertyIndex::new();
        index.index(NodeId(1), "type", "group");
        index.index(NodeId(1), "type", "group");
        assert_eq!(index.find("type", "group"), vec![NodeId(1)]);
    }

    #[test]
    fn unindex_is_idempotent_and_prunes() {
        let mut index = PropertyIndex::new();
        index.index(NodeId(1), "type", "group");
        index.unindex(NodeId(1), "type", "group");
        index.unindex(NodeId(1), "type", "group");
        index.unindex(NodeId(2), "missing", "pair");

        assert!(index.find("type", "group").is_empty());
        assert_eq!(index.bucket_count(), 0);
    }

    #[test]
    fn find_returns_ascending_ids() {
        let mut index = PropertyIndex::new();
        index.index(NodeId(5), "type", "group");
        index.index(NodeId(2), "type", "group");
        index.index(NodeId(9), "type", "user");

        assert_eq!(index.find("type", "group"), vec![NodeId(2), NodeId(5)]);
        assert!(index.contains(NodeId(9), "type", "user"));
        assert!(!index.contains(NodeId(9), "type", "group"));
    }
}
