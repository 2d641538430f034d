//! # Graph Engine
//!
//! The in-memory property graph for Hawthorn.
//!
//! `Graph` composes the four stores (nodes, property index, edge type
//! registry, edges) and is the only place that mutates them, so every
//! invariant that spans more than one store is kept here:
//! - the property index is exactly the inverse of all property maps
//! - outbound and inbound adjacency mirror each other
//! - edge type names and ids form a bijection

use crate::edges::EdgeStore;
use crate::index::PropertyIndex;
use crate::nodes::NodeStore;
use crate::query::{CrawlLimits, Query};
use crate::registry::EdgeTypeRegistry;
use crate::{Edge, EdgeTypeId, EdgeWeight, HawthornError, NodeId, Properties};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// GRAPHSTORE TRAIT
// =============================================================================

/// The GraphStore trait is the engine's call surface.
///
/// Hosts (language bindings, the CLI, a persistence layer) call these
/// operations and receive plain values: node ids, property maps and
/// `(neighbor, weight)` pairs.
pub trait GraphStore {
    /// Create a node. Initial properties go through `set_property`, so the
    /// property index sees them.
    fn create_node(&mut self, properties: Properties) -> Result<NodeId, HawthornError>;

    /// Get a copy of a node's property map.
    fn get_properties(&self, node: NodeId) -> Result<Properties, HawthornError>;

    /// Insert or overwrite one property, keeping the index consistent.
    fn set_property(&mut self, node: NodeId, key: &str, value: &str)
    -> Result<(), HawthornError>;

    /// Ids of all nodes whose `key` currently equals `value`, in creation
    /// order. Empty when nothing matches.
    fn find(&self, key: &str, value: &str) -> Vec<NodeId>;

    /// Insert or update a typed edge. Registers `edge_type` on first use.
    fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
        weight: EdgeWeight,
    ) -> Result<(), HawthornError>;

    /// Remove a typed edge. Removing a missing edge is a no-op.
    fn disconnect(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
    ) -> Result<(), HawthornError>;

    /// Check for a direct edge `source -> target` of `edge_type`.
    fn are_connected(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
    ) -> Result<bool, HawthornError>;

    /// `(target, weight)` pairs leaving `node` through `edge_type`.
    fn outbound(
        &self,
        node: NodeId,
        edge_type: &str,
    ) -> Result<Vec<(NodeId, EdgeWeight)>, HawthornError>;

    /// `(source, weight)` pairs arriving at `node` through `edge_type`.
    fn inbound(
        &self,
        node: NodeId,
        edge_type: &str,
    ) -> Result<Vec<(NodeId, EdgeWeight)>, HawthornError>;

    /// Outbound neighbor ids only.
    fn connected(&self, node: NodeId, edge_type: &str) -> Result<Vec<NodeId>, HawthornError>;

    /// Lazy sequence of all live node ids. Each call rescans the store.
    fn all_nodes(&self) -> impl Iterator<Item = NodeId> + '_;

    /// Delete a node together with its edges and index entries.
    fn delete_node(&mut self, node: NodeId) -> Result<(), HawthornError>;

    /// Get the total number of nodes.
    fn node_count(&self) -> usize;

    /// Get the total number of edges.
    fn edge_count(&self) -> usize;
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The main Graph structure.
///
/// Uses `BTreeMap`-backed stores throughout, so every sequence the graph
/// hands out has a stable order for a given state.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: NodeStore,
    index: PropertyIndex,
    edge_types: EdgeTypeRegistry,
    edges: EdgeStore,

    /// Default bounds for queries started with `Graph::query`.
    crawl_limits: CrawlLimits,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default crawl bounds used by `query`.
    #[must_use]
    pub fn with_crawl_limits(mut self, limits: CrawlLimits) -> Self {
        self.crawl_limits = limits;
        self
    }

    #[must_use]
    pub fn crawl_limits(&self) -> CrawlLimits {
        self.crawl_limits
    }

    /// Start a query against this graph with the graph's default bounds.
    #[must_use]
    pub fn query(&self) -> Query<'_> {
        Query::new(self).with_limits(self.crawl_limits)
    }

    // -------------------------------------------------------------------------
    // Store access (read-only)
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn node_store(&self) -> &NodeStore {
        &self.nodes
    }

    #[must_use]
    pub fn edge_store(&self) -> &EdgeStore {
        &self.edges
    }

    #[must_use]
    pub fn property_index(&self) -> &PropertyIndex {
        &self.index
    }

    #[must_use]
    pub fn edge_types(&self) -> &EdgeTypeRegistry {
        &self.edge_types
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Fail with `NodeNotFound` unless `id` is live.
    pub fn ensure_node(&self, id: NodeId) -> Result<(), HawthornError> {
        if self.nodes.contains(id) {
            Ok(())
        } else {
            Err(HawthornError::NodeNotFound(id))
        }
    }

    /// Resolve a registered edge type name.
    pub fn resolve_edge_type(&self, name: &str) -> Result<EdgeTypeId, HawthornError> {
        self.edge_types.resolve(name)
    }

    /// Reverse lookup of an edge type id.
    #[must_use]
    pub fn edge_type_name(&self, id: EdgeTypeId) -> Option<&str> {
        self.edge_types.name(id)
    }

    /// Read a single property.
    pub fn get_property(&self, node: NodeId, key: &str) -> Result<Option<String>, HawthornError> {
        Ok(self.nodes.property(node, key)?.map(str::to_string))
    }

    /// Outbound edges of one type as full records.
    pub fn outbound_edges(&self, node: NodeId, edge_type: &str) -> Result<Vec<Edge>, HawthornError> {
        let type_id = self.edge_types.resolve(edge_type)?;
        self.ensure_node(node)?;
        Ok(self
            .edges
            .outbound(node, type_id)
            .map(|(target, weight)| Edge::new(node, target, edge_type, weight))
            .collect())
    }

    /// Inbound edges of one type as full records.
    pub fn inbound_edges(&self, node: NodeId, edge_type: &str) -> Result<Vec<Edge>, HawthornError> {
        let type_id = self.edge_types.resolve(edge_type)?;
        self.ensure_node(node)?;
        Ok(self
            .edges
            .inbound(node, type_id)
            .map(|(source, weight)| Edge::new(source, node, edge_type, weight))
            .collect())
    }

    /// Every edge in the graph, ordered by source, type id, then target.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().map(|(source, target, type_id, weight)| {
            let name = self.edge_types.name(type_id).unwrap_or_default();
            Edge::new(source, target, name, weight)
        })
    }

    // -------------------------------------------------------------------------
    // Transitive reachability over one edge type
    // -------------------------------------------------------------------------

    /// All nodes reachable from `source` through `edge_type` edges,
    /// depth-first. `source` comes first; every node appears once.
    pub fn reachable(&self, source: NodeId, edge_type: &str) -> Result<Vec<NodeId>, HawthornError> {
        let type_id = self.edge_types.resolve(edge_type)?;
        self.ensure_node(source)?;

        let mut seen = BTreeSet::from([source]);
        let mut order = vec![source];
        let mut stack = vec![source];

        while let Some(current) = stack.pop() {
            for next in self.edges.connected(current, type_id) {
                if seen.insert(next) {
                    order.push(next);
                    stack.push(next);
                }
            }
        }

        Ok(order)
    }

    /// Whether a path of `edge_type` edges leads from `source` to `target`.
    ///
    /// A node only reaches itself through a cycle.
    pub fn is_reachable(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
    ) -> Result<bool, HawthornError> {
        let type_id = self.edge_types.resolve(edge_type)?;
        if !self.nodes.contains(source) || !self.nodes.contains(target) {
            return Ok(false);
        }

        let mut visited = BTreeSet::new();
        let mut stack = vec![source];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            for next in self.edges.connected(current, type_id) {
                if next == target {
                    return Ok(true);
                }
                if !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }

        Ok(false)
    }
}

impl GraphStore for Graph {
    fn create_node(&mut self, properties: Properties) -> Result<NodeId, HawthornError> {
        let id = self.nodes.create()?;
        for (key, value) in &properties {
            self.set_property(id, key, value)?;
        }
        tracing::debug!(node = id.0, properties = properties.len(), "created node");
        Ok(id)
    }

    fn get_properties(&self, node: NodeId) -> Result<Properties, HawthornError> {
        self.nodes.properties(node).cloned()
    }

    fn set_property(
        &mut self,
        node: NodeId,
        key: &str,
        value: &str,
    ) -> Result<(), HawthornError> {
        let previous = self.nodes.insert_property(node, key, value)?;
        if let Some(previous) = previous {
            if previous == value {
                return Ok(());
            }
            self.index.unindex(node, key, &previous);
        }
        self.index.index(node, key, value);
        Ok(())
    }

    fn find(&self, key: &str, value: &str) -> Vec<NodeId> {
        self.index.find(key, value)
    }

    fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
        weight: EdgeWeight,
    ) -> Result<(), HawthornError> {
        if !weight.is_finite() {
            return Err(HawthornError::InvalidWeight(weight.value()));
        }
        self.ensure_node(source)?;
        self.ensure_node(target)?;

        let type_id = self.edge_types.resolve_or_create(edge_type)?;
        let previous = self.edges.connect(source, target, type_id, weight);
        tracing::debug!(
            source = source.0,
            target = target.0,
            edge_type,
            weight = weight.value(),
            updated = previous.is_some(),
            "connected"
        );
        Ok(())
    }

    fn disconnect(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
    ) -> Result<(), HawthornError> {
        let type_id = self.edge_types.resolve(edge_type)?;
        let removed = self.edges.disconnect(source, target, type_id);
        tracing::debug!(
            source = source.0,
            target = target.0,
            edge_type,
            removed,
            "disconnected"
        );
        Ok(())
    }

    fn are_connected(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
    ) -> Result<bool, HawthornError> {
        let type_id = self.edge_types.resolve(edge_type)?;
        Ok(self.edges.are_connected(source, target, type_id))
    }

    fn outbound(
        &self,
        node: NodeId,
        edge_type: &str,
    ) -> Result<Vec<(NodeId, EdgeWeight)>, HawthornError> {
        let type_id = self.edge_types.resolve(edge_type)?;
        self.ensure_node(node)?;
        Ok(self.edges.outbound(node, type_id).collect())
    }

    fn inbound(
        &self,
        node: NodeId,
        edge_type: &str,
    ) -> Result<Vec<(NodeId, EdgeWeight)>, HawthornError> {
        let type_id = self.edge_types.resolve(edge_type)?;
        self.ensure_node(node)?;
        Ok(self.edges.inbound(node, type_id).collect())
    }

    fn connected(&self, node: NodeId, edge_type: &str) -> Result<Vec<NodeId>, HawthornError> {
        let type_id = self.edge_types.resolve(edge_type)?;
        self.ensure_node(node)?;
        Ok(self.edges.connected(node, type_id).collect())
    }

    fn all_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.ids()
    }

    fn delete_node(&mut self, node: NodeId) -> Result<(), HawthornError> {
        let properties = self.nodes.remove(node)?;
        for (key, value) in &properties {
            self.index.unindex(node, key, value);
        }
        let removed_edges = self.edges.remove_node(node);
        tracing::debug!(node = node.0, removed_edges, "deleted node");
        Ok(())
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// =============================================================================
// SERIALIZATION SUPPORT
// =============================================================================

/// A node row in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableNode {
    pub id: u64,
    pub properties: Properties,
}

/// Serializable representation of the graph for persistence.
///
/// Independent tables keyed by the stable node and type ids. The property
/// index is not stored; it is rebuilt from node properties on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableGraph {
    pub nodes: Vec<SerializableNode>,
    pub edge_types: Vec<(u16, String)>,
    pub edges: Vec<(u64, u64, u16, f64)>,
    pub next_node_id: u64,
}

impl From<&Graph> for SerializableGraph {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph
                .nodes
                .iter()
                .map(|(id, properties)| SerializableNode {
                    id: id.0,
                    properties: properties.clone(),
                })
                .collect(),
            edge_types: graph
                .edge_types
                .iter()
                .map(|(id, name)| (id.0, name.to_string()))
                .collect(),
            edges: graph
                .edges
                .iter()
                .map(|(source, target, type_id, weight)| {
                    (source.0, target.0, type_id.0, weight.value())
                })
                .collect(),
            next_node_id: graph.nodes.next_node_id(),
        }
    }
}

impl TryFrom<SerializableGraph> for Graph {
    type Error = HawthornError;

    /// Rebuild a graph, preserving node and type ids.
    ///
    /// Edges that reference missing nodes or unregistered types are
    /// rejected rather than dropped.
    fn try_from(sg: SerializableGraph) -> Result<Self, Self::Error> {
        let mut graph = Graph::new();

        for (id, name) in &sg.edge_types {
            graph.edge_types.restore(EdgeTypeId(*id), name)?;
        }

        for node in &sg.nodes {
            let id = NodeId(node.id);
            graph.nodes.restore(id);
            for (key, value) in &node.properties {
                graph.set_property(id, key, value)?;
            }
        }
        graph.nodes.set_next_node_id(sg.next_node_id);

        for (source, target, type_id, weight) in sg.edges {
            let (source, target, type_id) = (NodeId(source), NodeId(target), EdgeTypeId(type_id));
            let weight = EdgeWeight::new(weight);
            graph.ensure_node(source)?;
            graph.ensure_node(target)?;
            if graph.edge_types.name(type_id).is_none() {
                return Err(HawthornError::SerializationError(format!(
                    "Edge references unregistered type id {}",
                    type_id.0
                )));
            }
            if !weight.is_finite() {
                return Err(HawthornError::InvalidWeight(weight.value()));
            }
            graph.edges.connect(source, target, type_id, weight);
        }

        Ok(graph)
    }
}

// =============================================================================
// TESTS
// =============================================================================
