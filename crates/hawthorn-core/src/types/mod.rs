//! # Core Type Definitions
//!
//! This module contains the core types shared by every Hawthorn store:
//! - Graph identifiers (`NodeId`, `EdgeTypeId`)
//! - Edge data (`EdgeWeight`, `Edge`)
//! - Node data (`Properties`)
//! - Error types (`HawthornError`)
//!
//! ## Ordering Guarantees
//!
//! Identifiers implement `Ord` so that every store can key its maps with
//! `BTreeMap`/`BTreeSet` and hand out results in a stable order.

use crate::primitives::DEFAULT_EDGE_WEIGHT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Unique identifier for a node.
///
/// Ids are assigned from a monotonic counter and never reused, even after
/// the node is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Identifier of a registered edge type.
///
/// Id 0 is reserved and never assigned; the first registered type gets 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeTypeId(pub u16);

// =============================================================================
// EDGE WEIGHT
// =============================================================================

/// Weight carried by a directed edge.
///
/// The engine stores weights but never computes with them, so any finite
/// value is accepted. `Default` is `1.0`, the weight of a connect that does
/// not specify one.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct EdgeWeight(pub f64);

impl EdgeWeight {
    /// Create a new edge weight with the given value.
    #[must_use]
    pub const fn new(weight: f64) -> Self {
        Self(weight)
    }

    /// Get the raw weight value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// NaN and infinities are rejected at connect time.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Default for EdgeWeight {
    fn default() -> Self {
        Self(DEFAULT_EDGE_WEIGHT)
    }
}

// =============================================================================
// NODE PROPERTIES
// =============================================================================

/// A node's property map. Keys and values are plain strings.
pub type Properties = BTreeMap<String, String>;

// =============================================================================
// EDGE
// =============================================================================

/// A fully resolved edge record, as handed out to callers.
///
/// Inside the engine an edge has no identity of its own; it is the
/// `(source, target, type)` triple plus a weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: String,
    pub weight: EdgeWeight,
}

impl Edge {
    /// Create a new edge record.
    #[must_use]
    pub fn new(
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<String>,
        weight: EdgeWeight,
    ) -> Self {
        Self {
            source,
            target,
            edge_type: edge_type.into(),
            weight,
        }
    }
}

// =============================================================================
// CRAWL BOUNDS
// =============================================================================

/// The crawl bound that stopped a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlBound {
    /// More nodes were discovered than allowed.
    MaxVisited(usize),
    /// A node was discovered further from the start than allowed.
    MaxDepth(usize),
}

impl fmt::Display for CrawlBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxVisited(max) => write!(f, "max_visited = {}", max),
            Self::MaxDepth(max) => write!(f, "max_depth = {}", max),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Hawthorn engine.
///
/// - No silent failures: every error reaches the caller of the offending call
/// - Nothing is retried internally; the engine performs no I/O
/// - The engine never panics
#[derive(Debug, Error)]
pub enum HawthornError {
    /// The referenced node does not exist.
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// The edge type name was never registered by a connect.
    #[error("Unknown edge type: {0}")]
    UnknownEdgeType(String),

    /// Edge weights must be finite.
    #[error("Invalid edge weight: {0}")]
    InvalidWeight(f64),

    /// Every edge type id has been handed out.
    #[error("Edge type limit reached ({0} types)")]
    EdgeTypeLimit(usize),

    /// The node id counter is exhausted.
    #[error("Node id limit reached (next id would exceed {0})")]
    NodeIdLimit(u64),

    /// A caller-supplied filter predicate failed; the query is aborted.
    #[error("Filter predicate failed: {0}")]
    FilterFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A crawl hit one of its configured bounds.
    #[error("Crawl limit exceeded: {bound} (discovered {discovered} nodes)")]
    CrawlLimitExceeded { bound: CrawlBound, discovered: usize },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A command was invoked with an invalid combination of arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_weight_defaults_to_one() {
        assert_eq!(EdgeWeight::default().value(), 1.0);
    }

    #[test]
    fn edge_weight_finiteness() {
        assert!(EdgeWeight::new(0.25).is_finite());
        assert!(!EdgeWeight::new(f64::NAN).is_finite());
        assert!(!EdgeWeight::new(f64::INFINITY).is_finite());
    }

    #[test]
    fn node_ids_order_by_value() {
        let mut ids = vec![NodeId(3), NodeId(1), NodeId(2)];
        ids.sort();
        assert_eq!(ids, vec![NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn error_messages_name_the_culprit() {
        let err = HawthornError::UnknownEdgeType("read".to_string());
        assert_eq!(err.to_string(), "Unknown edge type: read");

        let err = HawthornError::NodeNotFound(NodeId(7));
        assert!(err.to_string().contains('7'));

        let err = HawthornError::CrawlLimitExceeded {
            bound: CrawlBound::MaxDepth(3),
            discovered: 12,
        };
        assert_eq!(
            err.to_string(),
            "Crawl limit exceeded: max_depth = 3 (discovered 12 nodes)"
        );
    }
}
