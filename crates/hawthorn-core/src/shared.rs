//! # Shared Graph
//!
//! A cloneable, thread-safe handle around one `Graph`.
//!
//! A single read-write lock guards all four stores together. Mutations that
//! touch several stores (`set_property`, `connect`, `disconnect`,
//! `delete_node`) run under one write guard, so readers never observe a
//! property without its index entry or one direction of an edge without the
//! other. Queries run under one read guard for their whole chain, so a
//! crawl sees a single consistent adjacency snapshot.

use crate::graph::{Graph, GraphStore};
use crate::query::Query;
use crate::{EdgeWeight, HawthornError, NodeId, Properties};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, lock-guarded graph handle.
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<Graph>>,
}

impl SharedGraph {
    /// Create a handle around an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing graph.
    #[must_use]
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Run `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Graph) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Run `f` under the write lock. Everything `f` does is atomic to readers.
    pub fn write<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Build and run a query under a single read lock.
    ///
    /// The graph's default crawl limits apply.
    pub fn query<R>(
        &self,
        f: impl FnOnce(Query<'_>) -> Result<R, HawthornError>,
    ) -> Result<R, HawthornError> {
        self.read(|graph| f(graph.query()))
    }

    /// Copy of the current graph state.
    #[must_use]
    pub fn snapshot(&self) -> Graph {
        self.read(Graph::clone)
    }

    // -------------------------------------------------------------------------
    // Call-surface conveniences, one lock acquisition each
    // -------------------------------------------------------------------------

    pub fn create_node(&self, properties: Properties) -> Result<NodeId, HawthornError> {
        self.write(|graph| graph.create_node(properties))
    }

    pub fn get_properties(&self, node: NodeId) -> Result<Properties, HawthornError> {
        self.read(|graph| graph.get_properties(node))
    }

    pub fn set_property(&self, node: NodeId, key: &str, value: &str) -> Result<(), HawthornError> {
        self.write(|graph| graph.set_property(node, key, value))
    }

    pub fn find(&self, key: &str, value: &str) -> Vec<NodeId> {
        self.read(|graph| graph.find(key, value))
    }

    pub fn connect(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
        weight: EdgeWeight,
    ) -> Result<(), HawthornError> {
        self.write(|graph| graph.connect(source, target, edge_type, weight))
    }

    pub fn disconnect(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
    ) -> Result<(), HawthornError> {
        self.write(|graph| graph.disconnect(source, target, edge_type))
    }

    pub fn are_connected(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
    ) -> Result<bool, HawthornError> {
        self.read(|graph| graph.are_connected(source, target, edge_type))
    }

    pub fn delete_node(&self, node: NodeId) -> Result<(), HawthornError> {
        self.write(|graph| graph.delete_node(node))
    }

    /// Ids of all live nodes at the time of the call.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        self.read(|graph| graph.all_nodes().collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
