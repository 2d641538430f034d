//! # Bulk Load Format
//!
//! JSON documents accepted by `hawthorn load`.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "key": "admins", "properties": { "type": "group", "role": "admin" } },
//!     { "key": "web", "properties": { "type": "machine", "ip": "10.0.0.1" } }
//!   ],
//!   "edges": [
//!     { "source": "admins", "target": "web", "type": "read", "weight": 1.0 }
//!   ]
//! }
//! ```
//!
//! `key` labels only exist inside the document; edges reference them and the
//! load result maps each label to the node id it received.

use hawthorn_core::{EdgeWeight, Graph, GraphStore, HawthornError, NodeId, Properties};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of nodes plus edges in one document.
pub const MAX_LOAD_ITEMS: usize = 1_000_000;

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadDocument {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub key: String,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Defaults to 1.0.
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Outcome of applying a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Document key -> assigned node id.
    pub nodes: BTreeMap<String, NodeId>,
    pub edges: usize,
}

// =============================================================================
// APPLY
// =============================================================================

impl LoadDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HawthornError> {
        let document: Self = serde_json::from_slice(bytes).map_err(|e| {
            HawthornError::SerializationError(format!("Invalid load document: {}", e))
        })?;

        let items = document.nodes.len().saturating_add(document.edges.len());
        if items > MAX_LOAD_ITEMS {
            return Err(HawthornError::SerializationError(format!(
                "Load document has {} items, maximum is {}",
                items, MAX_LOAD_ITEMS
            )));
        }
        Ok(document)
    }

    /// Check every key reference before touching the graph.
    fn validate(&self) -> Result<(), HawthornError> {
        let mut keys = std::collections::BTreeSet::new();
        for node in &self.nodes {
            if !keys.insert(node.key.as_str()) {
                return Err(HawthornError::SerializationError(format!(
                    "Duplicate node key '{}'",
                    node.key
                )));
            }
        }
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !keys.contains(endpoint.as_str()) {
                    return Err(HawthornError::SerializationError(format!(
                        "Edge references unknown node key '{}'",
                        endpoint
                    )));
                }
            }
            if let Some(weight) = edge.weight
                && !weight.is_finite()
            {
                return Err(HawthornError::InvalidWeight(weight));
            }
        }
        Ok(())
    }

    /// Create every node, then every edge.
    ///
    /// The document is validated first, so a bad reference leaves `graph`
    /// untouched.
    pub fn apply(&self, graph: &mut Graph) -> Result<LoadReport, HawthornError> {
        self.validate()?;

        let mut report = LoadReport::default();
        for node in &self.nodes {
            let id = graph.create_node(node.properties.clone())?;
            report.nodes.insert(node.key.clone(), id);
        }

        for edge in &self.edges {
            let source = resolve_key(&report.nodes, &edge.source)?;
            let target = resolve_key(&report.nodes, &edge.target)?;
            let weight = edge.weight.map(EdgeWeight::new).unwrap_or_default();
            graph.connect(source, target, &edge.edge_type, weight)?;
            report.edges = report.edges.saturating_add(1);
        }

        tracing::info!(
            nodes = report.nodes.len(),
            edges = report.edges,
            "bulk load applied"
        );
        Ok(report)
    }
}

/// Map a document key to the node created for it.
fn resolve_key(nodes: &BTreeMap<String, NodeId>, key: &str) -> Result<NodeId, HawthornError> {
    nodes.get(key).copied().ok_or_else(|| {
        HawthornError::SerializationError(format!("Edge references unknown node key '{}'", key))
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "nodes": [
            { "key": "admins", "properties": { "type": "group", "role": "admin" } },
            { "key": "web", "properties": { "type": "machine", "ip": "10.0.0.1" } }
        ],
        "edges": [
            { "source": "admins", "target": "web", "type": "read" }
        ]
    }"#;

    #[test]
    fn applies_nodes_then_edges() {
        let document = LoadDocument::from_slice(DOC.as_bytes()).expect("parse");
        let mut graph = Graph::new();
        let report = document.apply(&mut graph).expect("apply");

        let admins = report.nodes["admins"];
        let web = report.nodes["web"];
        assert_eq!(report.edges, 1);
        assert!(graph.are_connected(admins, web, "read").expect("check"));
        assert_eq!(graph.find("type", "machine"), vec![web]);
        assert_eq!(
            graph.outbound(admins, "read").expect("out"),
            vec![(web, EdgeWeight::default())]
        );
    }

    #[test]
    fn unknown_key_leaves_graph_untouched() {
        let document = LoadDocument::from_slice(
            br#"{ "nodes": [{ "key": "a" }], "edges": [{ "source": "a", "target": "b", "type": "read" }] }"#,
        )
        .expect("parse");
        let mut graph = Graph::new();

        let err = document.apply(&mut graph).expect_err("unknown key");
        assert!(err.to_string().contains("unknown node key 'b'"));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn duplicate_key_rejected() {
        let document =
            LoadDocument::from_slice(br#"{ "nodes": [{ "key": "a" }, { "key": "a" }] }"#)
                .expect("parse");
        assert!(document.apply(&mut Graph::new()).is_err());
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(LoadDocument::from_slice(br#"{ "vertices": [] }"#).is_err());
    }

    #[test]
    fn unresolved_key_is_an_error() {
        let mut nodes = BTreeMap::new();
        nodes.insert("a".to_string(), NodeId(1));

        assert_eq!(resolve_key(&nodes, "a").expect("resolve"), NodeId(1));
        assert!(matches!(
            resolve_key(&nodes, "zz"),
            Err(HawthornError::SerializationError(msg)) if msg.contains("'zz'")
        ));
    }
}
