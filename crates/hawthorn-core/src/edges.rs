//! # Edge Store
//!
//! Directed, weighted adjacency lists keyed by `(node, edge type)`, kept
//! separately for the outbound and inbound direction.
//!
//! Every mutation writes both directions, so `A -> B` of type `T` is in
//! `outbound(A, T)` iff it is in `inbound(B, T)`. Adjacency maps are
//! `BTreeMap`s, so neighbor order is ascending by node id and stable for a
//! given store state.

use crate::{EdgeTypeId, EdgeWeight, NodeId};
use std::collections::BTreeMap;

type Adjacency = BTreeMap<(NodeId, EdgeTypeId), BTreeMap<NodeId, EdgeWeight>>;

/// The typed edge store.
#[derive(Debug, Clone, Default)]
pub struct EdgeStore {
    /// (source, type) -> (target -> weight)
    outbound: Adjacency,

    /// (target, type) -> (source -> weight)
    inbound: Adjacency,
}

impl EdgeStore {
    /// Create a new empty edge store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the edge `source -> target` of type `edge_type`.
    ///
    /// A repeated connect on the same triple overwrites the weight; there are
    /// no parallel edges. Returns the previous weight, if any.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: EdgeTypeId,
        weight: EdgeWeight,
    ) -> Option<EdgeWeight> {
        let previous = self
            .outbound
            .entry((source, edge_type))
            .or_default()
            .insert(target, weight);
        self.inbound
            .entry((target, edge_type))
            .or_default()
            .insert(source, weight);
        previous
    }

    /// Remove the edge `source -> target` of type `edge_type` from both
    /// directions. Returns whether an edge was removed.
    pub fn disconnect(&mut self, source: NodeId, target: NodeId, edge_type: EdgeTypeId) -> bool {
        let removed = remove_entry(&mut self.outbound, (source, edge_type), target);
        remove_entry(&mut self.inbound, (target, edge_type), source);
        removed
    }

    /// True iff the outbound entry exists.
    #[must_use]
    pub fn are_connected(&self, source: NodeId, target: NodeId, edge_type: EdgeTypeId) -> bool {
        self.weight(source, target, edge_type).is_some()
    }

    /// Weight of a single edge.
    #[must_use]
    pub fn weight(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: EdgeTypeId,
    ) -> Option<EdgeWeight> {
        self.outbound.get(&(source, edge_type))?.get(&target).copied()
    }

    /// Outbound `(target, weight)` pairs of `node` for one edge type.
    pub fn outbound(
        &self,
        node: NodeId,
        edge_type: EdgeTypeId,
    ) -> impl Iterator<Item = (NodeId, EdgeWeight)> + '_ {
        adjacent(&self.outbound, node, edge_type)
    }

    /// Inbound `(source, weight)` pairs of `node` for one edge type.
    pub fn inbound(
        &self,
        node: NodeId,
        edge_type: EdgeTypeId,
    ) -> impl Iterator<Item = (NodeId, EdgeWeight)> + '_ {
        adjacent(&self.inbound, node, edge_type)
    }

    /// Outbound neighbor ids only; the crawl step uses this.
    pub fn connected(
        &self,
        node: NodeId,
        edge_type: EdgeTypeId,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.outbound(node, edge_type).map(|(target, _)| target)
    }

    /// Remove every edge incident to `node`, of every type and in both
    /// directions. Returns the number of edges removed.
    pub fn remove_node(&mut self, node: NodeId) -> usize {
        let mut removed = 0usize;

        let outgoing: Vec<_> = take_node_lists(&mut self.outbound, node);
        for (edge_type, targets) in outgoing {
            for target in targets.keys() {
                remove_entry(&mut self.inbound, (*target, edge_type), node);
                removed = removed.saturating_add(1);
            }
        }

        let incoming: Vec<_> = take_node_lists(&mut self.inbound, node);
        for (edge_type, sources) in incoming {
            for source in sources.keys() {
                // A self-loop was already counted on the outbound side.
                if remove_entry(&mut self.outbound, (*source, edge_type), node) {
                    removed = removed.saturating_add(1);
                }
            }
        }

        removed
    }

    /// Every edge as `(source, target, type, weight)`, ordered by source,
    /// then type, then target.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId, EdgeTypeId, EdgeWeight)> + '_ {
        self.outbound.iter().flat_map(|((source, edge_type), targets)| {
            targets
                .iter()
                .map(move |(target, weight)| (*source, *target, *edge_type, *weight))
        })
    }

    /// Total number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outbound.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty()
    }
}

// =============================================================================
// ADJACENCY HELPERS
// =============================================================================

fn adjacent(
    lists: &Adjacency,
    node: NodeId,
    edge_type: EdgeTypeId,
) -> impl Iterator<Item = (NodeId, EdgeWeight)> + '_ {
    lists
        .get(&(node, edge_type))
        .into_iter()
        .flat_map(|others| others.iter().map(|(other, weight)| (*other, *weight)))
}

/// Remove `other` from the list at `key`, dropping the list once empty.
fn remove_entry(lists: &mut Adjacency, key: (NodeId, EdgeTypeId), other: NodeId) -> bool {
    let Some(others) = lists.get_mut(&key) else {
        return false;
    };
    let removed = others.remove(&other).is_some();
    if others.is_empty() {
        lists.remove(&key);
    }
    removed
}

/// Detach all of `node`'s lists (every type) from one direction.
fn take_node_lists(
    lists: &mut Adjacency,
    node: NodeId,
) -> Vec<(EdgeTypeId, BTreeMap<NodeId, EdgeWeight>)> {
    let keys: Vec<_> = lists
        .range((node, EdgeTypeId(u16::MIN))..=(node, EdgeTypeId(u16::MAX)))
        .map(|(key, _)| *key)
        .collect();

    keys.into_iter()
        .filter_map(|key| lists.remove(&key).map(|others| (key.1, others)))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const READ: EdgeTypeId = EdgeTypeId(1);
    const WRITE: EdgeTypeId = EdgeTypeId(2);

    #[test]
    fn connect_writes_both_directions() {
        let mut edges = EdgeStore::new();
        edges.connect(NodeId(1), NodeId(2), READ, EdgeWeight::new(0.5));

        assert!(edges.are_connected(NodeId(1), NodeId(2), READ));
        assert!(!edges.are_connected(NodeId(2), NodeId(1), READ));
        assert_eq!(
            edges.inbound(NodeId(2), READ).collect::<Vec<_>>(),
            vec![(NodeId(1), EdgeWeight::new(0.5))]
        );
    }

    #[test]
    fn repeated_connect_updates_weight() {
        let mut edges = EdgeStore::new();
        edges.connect(NodeId(1), NodeId(2), READ, EdgeWeight::new(1.0));
        let previous = edges.connect(NodeId(1), NodeId(2), READ, EdgeWeight::new(3.0));

        assert_eq!(previous, Some(EdgeWeight::new(1.0)));
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges.weight(NodeId(1), NodeId(2), READ),
            Some(EdgeWeight::new(3.0))
        );
        assert_eq!(
            edges.inbound(NodeId(2), READ).collect::<Vec<_>>(),
            vec![(NodeId(1), EdgeWeight::new(3.0))]
        );
    }

    #[test]
    fn types_are_isolated() {
        let mut edges = EdgeStore::new();
        edges.connect(NodeId(1), NodeId(2), READ, EdgeWeight::default());

        assert!(!edges.are_connected(NodeId(1), NodeId(2), WRITE));
        assert_eq!(edges.outbound(NodeId(1), WRITE).count(), 0);
        assert_eq!(edges.inbound(NodeId(2), WRITE).count(), 0);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut edges = EdgeStore::new();
        edges.connect(NodeId(1), NodeId(2), READ, EdgeWeight::default());

        assert!(edges.disconnect(NodeId(1), NodeId(2), READ));
        assert!(!edges.disconnect(NodeId(1), NodeId(2), READ));
        assert!(edges.is_empty());
        assert_eq!(edges.inbound(NodeId(2), READ).count(), 0);
    }

    #[test]
    fn outbound_order_is_stable() {
        let mut edges = EdgeStore::new();
        edges.connect(NodeId(1), NodeId(4), READ, EdgeWeight::default());
        edges.connect(NodeId(1), NodeId(3), READ, EdgeWeight::default());

        let first: Vec<_> = edges.connected(NodeId(1), READ).collect();
        let second: Vec<_> = edges.connected(NodeId(1), READ).collect();
        assert_eq!(first, vec![NodeId(3), NodeId(4)]);
        assert_eq!(first, second);
    }

    #[test]
    fn remove_node_clears_every_incident_edge() {
        let mut edges = EdgeStore::new();
        edges.connect(NodeId(1), NodeId(2), READ, EdgeWeight::default());
        edges.connect(NodeId(1), NodeId(3), WRITE, EdgeWeight::default());
        edges.connect(NodeId(4), NodeId(1), READ, EdgeWeight::default());
        edges.connect(NodeId(1), NodeId(1), READ, EdgeWeight::default());
        edges.connect(NodeId(2), NodeId(3), READ, EdgeWeight::default());

        assert_eq!(edges.remove_node(NodeId(1)), 4);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges.inbound(NodeId(2), READ).count(), 0);
        assert_eq!(edges.inbound(NodeId(3), WRITE).count(), 0);
        assert_eq!(edges.outbound(NodeId(4), READ).count(), 0);
        assert!(edges.are_connected(NodeId(2), NodeId(3), READ));
    }
}
