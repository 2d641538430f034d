//! # Query Module
//!
//! A traversal builder over a borrowed `Graph`.
//!
//! A `Query` holds the current result set (node ids, no duplicates, in
//! first-encounter order) and each step replaces it:
//! - `start` / `start_at` / `start_from` seed the set
//! - `out` / `in_` expand one hop along true outbound / inbound adjacency
//! - `crawl` takes the breadth-first reachable set over several edge types
//! - `filter` / `try_filter` keep nodes whose properties match
//! - `contains` tests membership
//!
//! Steps consume and return the query, so they chain. The only state kept
//! between steps is the result set; visited sets are local to a step.

use crate::graph::Graph;
use crate::{CrawlBound, EdgeTypeId, EdgeWeight, HawthornError, NodeId, Properties};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// CRAWL LIMITS
// =============================================================================

/// Bounds for `Query::crawl`.
///
/// Both bounds are off by default and a crawl then runs until the reachable
/// set is exhausted. When a bound is hit the crawl fails with
/// `HawthornError::CrawlLimitExceeded`; results are never truncated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlLimits {
    /// Maximum number of nodes a single crawl may discover.
    pub max_visited: Option<usize>,
    /// Maximum number of hops from the starting set.
    pub max_depth: Option<usize>,
}

impl CrawlLimits {
    /// No bounds.
    pub const UNBOUNDED: Self = Self {
        max_visited: None,
        max_depth: None,
    };

    #[must_use]
    pub fn with_max_visited(mut self, max: usize) -> Self {
        self.max_visited = Some(max);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = Some(max);
        self
    }
}

// =============================================================================
// QUERY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Outbound,
    Inbound,
}

/// A composable traversal over a graph.
#[derive(Debug, Clone)]
pub struct Query<'g> {
    graph: &'g Graph,
    results: Vec<NodeId>,
    limits: CrawlLimits,
}

impl<'g> Query<'g> {
    /// Create an empty, unbounded query.
    #[must_use]
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            results: Vec::new(),
            limits: CrawlLimits::UNBOUNDED,
        }
    }

    /// Replace the crawl bounds of this query.
    #[must_use]
    pub fn with_limits(mut self, limits: CrawlLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Seed with every node whose `key` equals `value`.
    #[must_use]
    pub fn start(mut self, key: &str, value: &str) -> Self {
        self.results = self.graph.property_index().find(key, value);
        self
    }

    /// Seed with a single node.
    pub fn start_at(mut self, node: NodeId) -> Result<Self, HawthornError> {
        self.graph.ensure_node(node)?;
        self.results = vec![node];
        Ok(self)
    }

    /// Seed with an explicit set of nodes. Duplicates are dropped, first
    /// occurrence wins.
    pub fn start_from(
        mut self,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Result<Self, HawthornError> {
        let mut seen = BTreeSet::new();
        let mut results = Vec::new();
        for node in nodes {
            self.graph.ensure_node(node)?;
            if seen.insert(node) {
                results.push(node);
            }
        }
        self.results = results;
        Ok(self)
    }

    /// Replace the result set with the outbound neighbors of `edge_type`.
    pub fn out(self, edge_type: &str) -> Result<Self, HawthornError> {
        self.expand(edge_type, Direction::Outbound)
    }

    /// Replace the result set with the inbound neighbors of `edge_type`.
    pub fn in_(self, edge_type: &str) -> Result<Self, HawthornError> {
        self.expand(edge_type, Direction::Inbound)
    }

    fn expand(mut self, edge_type: &str, direction: Direction) -> Result<Self, HawthornError> {
        let graph = self.graph;
        let type_id = graph.resolve_edge_type(edge_type)?;
        let edges = graph.edge_store();

        let mut seen = BTreeSet::new();
        let mut next = Vec::new();
        for &node in &self.results {
            match direction {
                Direction::Outbound => {
                    push_unseen(edges.outbound(node, type_id), &mut seen, &mut next);
                }
                Direction::Inbound => {
                    push_unseen(edges.inbound(node, type_id), &mut seen, &mut next);
                }
            }
        }

        self.results = next;
        Ok(self)
    }

    /// Keep only nodes whose property map satisfies `predicate`.
    #[must_use]
    pub fn filter<F>(mut self, mut predicate: F) -> Self
    where
        F: FnMut(&Properties) -> bool,
    {
        let nodes = self.graph.node_store();
        self.results
            .retain(|&node| nodes.properties(node).is_ok_and(|props| predicate(props)));
        self
    }

    /// Like `filter`, but the predicate may fail. The first failure aborts
    /// the query with `HawthornError::FilterFailed`.
    pub fn try_filter<F, E>(mut self, mut predicate: F) -> Result<Self, HawthornError>
    where
        F: FnMut(&Properties) -> Result<bool, E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let nodes = self.graph.node_store();
        let mut kept = Vec::with_capacity(self.results.len());
        for &node in &self.results {
            let props = nodes.properties(node)?;
            if predicate(props).map_err(|e| HawthornError::FilterFailed(e.into()))? {
                kept.push(node);
            }
        }
        self.results = kept;
        Ok(self)
    }

    /// Keep only nodes whose `key` equals `value`.
    #[must_use]
    pub fn filter_property(self, key: &str, value: &str) -> Self {
        self.filter(|props| props.get(key).is_some_and(|v| v == value))
    }

    /// Breadth-first reachable set over the union of `edge_types`.
    ///
    /// Each pass walks the types in the given order and, for each type, every
    /// node of the current frontier. A neighbor not yet visited joins the next
    /// frontier and the result. The crawl stops after a pass discovers
    /// nothing. The starting nodes are treated as visited, so they are not
    /// part of the result even when a cycle leads back to them.
    pub fn crawl<S: AsRef<str>>(mut self, edge_types: &[S]) -> Result<Self, HawthornError> {
        let graph = self.graph;
        let type_ids = edge_types
            .iter()
            .map(|name| graph.resolve_edge_type(name.as_ref()))
            .collect::<Result<Vec<EdgeTypeId>, _>>()?;
        let edges = graph.edge_store();

        let mut visited: BTreeSet<NodeId> = self.results.iter().copied().collect();
        let mut frontier = std::mem::take(&mut self.results);
        let mut discovered = Vec::new();
        let mut depth = 0usize;

        while !frontier.is_empty() {
            depth = depth.saturating_add(1);
            let mut next = Vec::new();

            for &type_id in &type_ids {
                for &node in &frontier {
                    for neighbor in edges.connected(node, type_id) {
                        if !visited.insert(neighbor) {
                            continue;
                        }
                        self.check_limits(depth, discovered.len().saturating_add(1))?;
                        next.push(neighbor);
                        discovered.push(neighbor);
                    }
                }
            }

            frontier = next;
        }

        tracing::debug!(
            edge_types = type_ids.len(),
            depth,
            discovered = discovered.len(),
            "crawl finished"
        );
        self.results = discovered;
        Ok(self)
    }

    fn check_limits(&self, depth: usize, discovered: usize) -> Result<(), HawthornError> {
        let bound = match (self.limits.max_depth, self.limits.max_visited) {
            (Some(max), _) if depth > max => CrawlBound::MaxDepth(max),
            (_, Some(max)) if discovered > max => CrawlBound::MaxVisited(max),
            _ => return Ok(()),
        };
        tracing::warn!(%bound, discovered, "crawl aborted");
        Err(HawthornError::CrawlLimitExceeded {
            bound,
            discovered: discovered.saturating_sub(1),
        })
    }

    /// Whether `node` is in the current result set.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.results.contains(&node)
    }

    /// The current result set.
    #[must_use]
    pub fn results(&self) -> &[NodeId] {
        &self.results
    }

    #[must_use]
    pub fn into_results(self) -> Vec<NodeId> {
        self.results
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

fn push_unseen(
    neighbors: impl Iterator<Item = (NodeId, EdgeWeight)>,
    seen: &mut BTreeSet<NodeId>,
    next: &mut Vec<NodeId>,
) {
    for (neighbor, _) in neighbors {
        if seen.insert(neighbor) {
            next.push(neighbor);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
