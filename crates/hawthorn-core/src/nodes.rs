//! # Node Store
//!
//! Owns node identities and their property maps.
//!
//! The store knows nothing about the property index; `Graph` is responsible
//! for routing every property write through the index as well.

use crate::primitives::FIRST_NODE_ID;
use crate::{HawthornError, NodeId, Properties};
use std::collections::BTreeMap;

/// Node storage: NodeId -> Properties.
#[derive(Debug, Clone)]
pub struct NodeStore {
    nodes: BTreeMap<NodeId, Properties>,

    /// Next available NodeId. Never decremented, so ids are not reused.
    next_node_id: u64,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_node_id: FIRST_NODE_ID,
        }
    }
}

impl NodeStore {
    /// Create a new empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new node with an empty property map.
    ///
    /// Fails with `NodeIdLimit` once the counter cannot advance, so a live
    /// id is never handed out twice.
    pub fn create(&mut self) -> Result<NodeId, HawthornError> {
        let id = NodeId(self.next_node_id);
        let next = self
            .next_node_id
            .checked_add(1)
            .ok_or(HawthornError::NodeIdLimit(self.next_node_id))?;
        self.next_node_id = next;
        self.nodes.insert(id, Properties::new());
        Ok(id)
    }

    /// Re-register a node under its original id (snapshot restore).
    pub(crate) fn restore(&mut self, id: NodeId) {
        if id.0 >= self.next_node_id {
            self.next_node_id = id.0.saturating_add(1);
        }
        self.nodes.entry(id).or_default();
    }

    pub(crate) fn set_next_node_id(&mut self, next: u64) {
        self.next_node_id = self.next_node_id.max(next);
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get a node's property map.
    pub fn properties(&self, id: NodeId) -> Result<&Properties, HawthornError> {
        self.nodes.get(&id).ok_or(HawthornError::NodeNotFound(id))
    }

    /// Get one property of a node.
    pub fn property(&self, id: NodeId, key: &str) -> Result<Option<&str>, HawthornError> {
        Ok(self.properties(id)?.get(key).map(String::as_str))
    }

    /// Insert or overwrite a property. Returns the previous value of `key`.
    pub fn insert_property(
        &mut self,
        id: NodeId,
        key: &str,
        value: &str,
    ) -> Result<Option<String>, HawthornError> {
        let props = self
            .nodes
            .get_mut(&id)
            .ok_or(HawthornError::NodeNotFound(id))?;
        Ok(props.insert(key.to_string(), value.to_string()))
    }

    /// Remove a node, handing back its property map.
    pub fn remove(&mut self, id: NodeId) -> Result<Properties, HawthornError> {
        self.nodes.remove(&id).ok_or(HawthornError::NodeNotFound(id))
    }

    /// All live node ids in ascending order.
    ///
    /// Lazy over the current state; calling it again rescans.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// All live nodes with their properties, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Properties)> + '_ {
        self.nodes.iter().map(|(id, props)| (*id, props))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The id the next `create` will hand out.
    #[must_use]
    pub fn next_node_id(&self) -> u64 {
        self.next_node_id
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut store = NodeStore::new();
        assert_eq!(store.create().expect("create"), NodeId(1));
        assert_eq!(store.create().expect("create"), NodeId(2));
        assert_eq!(store.next_node_id(), 3);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut store = NodeStore::new();
        let a = store.create().expect("create");
        store.remove(a).expect("remove");

        let b = store.create().expect("create");
        assert_ne!(a, b);
        assert!(!store.contains(a));
    }

    #[test]
    fn insert_property_returns_previous_value() {
        let mut store = NodeStore::new();
        let id = store.create().expect("create");

        let first = store.insert_property(id, "role", "admin").expect("insert");
        assert_eq!(first, None);

        let second = store.insert_property(id, "role", "guest").expect("insert");
        assert_eq!(second.as_deref(), Some("admin"));
        assert_eq!(store.property(id, "role").expect("get"), Some("guest"));
    }

    #[test]
    fn unknown_node_fails() {
        let mut store = NodeStore::new();
        assert!(matches!(
            store.properties(NodeId(9)),
            Err(HawthornError::NodeNotFound(NodeId(9)))
        ));
        assert!(store.insert_property(NodeId(9), "k", "v").is_err());
    }

    #[test]
    fn ids_rescan_current_state() {
        let mut store = NodeStore::new();
        let a = store.create().expect("create");
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![a]);

        let b = store.create().expect("create");
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn exhausted_counter_never_reissues_a_live_id() {
        let mut store = NodeStore::new();
        store.restore(NodeId(u64::MAX));
        store
            .insert_property(NodeId(u64::MAX), "type", "group")
            .expect("insert");

        assert!(matches!(
            store.create(),
            Err(HawthornError::NodeIdLimit(u64::MAX))
        ));
        assert_eq!(
            store.property(NodeId(u64::MAX), "type").expect("get"),
            Some("group")
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn restore_advances_counter() {
        let mut store = NodeStore::new();
        store.restore(NodeId(10));
        assert!(store.contains(NodeId(10)));
        assert_eq!(store.create().expect("create"), NodeId(11));
    }
}
