//! # Persistence Format
//!
//! Binary snapshot encoding for Hawthorn graphs.
//!
//! Format: Header (5 bytes) + postcard-serialized `SerializableGraph`.
//! - 4 bytes: Magic ("HAWT")
//! - 1 byte: Version
//!
//! ## Validation
//!
//! Size and header are checked before the payload is parsed:
//! - Maximum payload size (`MAX_PERSISTENCE_PAYLOAD_SIZE`)
//! - Magic bytes and version
//! - Every edge row must reference a live node and a registered type
//!
//! The property index is never stored. It is rebuilt from node properties
//! on load, so a snapshot cannot carry a stale index.

use crate::{Graph, HawthornError, SerializableGraph, primitives};
use tracing::debug;

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum accepted snapshot size, checked before any allocation.
pub const MAX_PERSISTENCE_PAYLOAD_SIZE: usize = 500 * 1024 * 1024; // 500 MB

/// Header length in bytes.
const HEADER_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The persistence header precedes all graph data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), HawthornError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(HawthornError::SerializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(HawthornError::SerializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HawthornError> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(HawthornError::SerializationError(
                "Header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[0..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a graph to bytes (header + payload).
///
/// Pure transformation, no file I/O. The crawl limits of the graph are
/// runtime configuration and are not part of the snapshot.
pub fn graph_to_bytes(graph: &Graph) -> Result<Vec<u8>, HawthornError> {
    let header = PersistenceHeader::new();
    let serializable = SerializableGraph::from(graph);

    let payload = postcard::to_stdvec(&serializable)
        .map_err(|e| HawthornError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE.saturating_add(payload.len()));
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);

    debug!(
        nodes = serializable.nodes.len(),
        edges = serializable.edges.len(),
        bytes = result.len(),
        "graph serialized"
    );
    Ok(result)
}

/// Deserialize a graph from bytes.
///
/// Checks run in order: minimum size, maximum size, header, then payload.
/// Node ids, edge type ids, and the node id counter are preserved; the
/// property index is rebuilt.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<Graph, HawthornError> {
    if bytes.len() < HEADER_SIZE {
        return Err(HawthornError::SerializationError(format!(
            "Data too short: minimum {} bytes required",
            HEADER_SIZE
        )));
    }

    if bytes.len() > MAX_PERSISTENCE_PAYLOAD_SIZE {
        return Err(HawthornError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PERSISTENCE_PAYLOAD_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = &bytes[HEADER_SIZE..];
    let serializable: SerializableGraph = postcard::from_bytes(payload).map_err(|e| {
        HawthornError::SerializationError(format!("Failed to deserialize graph data: {}", e))
    })?;

    let graph = Graph::try_from(serializable)?;
    debug!(bytes = bytes.len(), "graph deserialized");
    Ok(graph)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeWeight, GraphStore, NodeId, Properties};

    fn sample_graph() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new();
        let mut props = Properties::new();
        props.insert("name".to_string(), "alice".to_string());
        let a = graph.create_node(props).expect("create");
        let b = graph.create_node(Properties::new()).expect("create");
        graph
            .connect(a, b, "member", EdgeWeight::new(0.5))
            .expect("connect");
        (graph, a, b)
    }

    #[test]
    fn header_roundtrip() {
        let header = PersistenceHeader::new();
        let restored = PersistenceHeader::from_bytes(&header.to_bytes()).expect("parse header");
        assert_eq!(restored, header);
        assert_eq!(&restored.magic, b"HAWT");
    }

    #[test]
    fn bytes_roundtrip_bit_exact() {
        let (graph, _, _) = sample_graph();

        let bytes1 = graph_to_bytes(&graph).expect("first serialize");
        let restored = graph_from_bytes(&bytes1).expect("deserialize");
        let bytes2 = graph_to_bytes(&restored).expect("second serialize");

        assert_eq!(
            bytes1, bytes2,
            "save -> load -> save must produce identical bytes"
        );
    }

    #[test]
    fn load_rebuilds_index_and_keeps_ids() {
        let (mut graph, a, b) = sample_graph();
        graph.delete_node(b).expect("delete");
        let c = graph.create_node(Properties::new()).expect("create");

        let bytes = graph_to_bytes(&graph).expect("serialize");
        let mut restored = graph_from_bytes(&bytes).expect("deserialize");

        assert_eq!(restored.find("name", "alice"), vec![a]);
        assert!(!restored.contains_node(b));
        assert!(restored.contains_node(c));

        // The id counter survives, so deleted ids are not handed out again.
        let d = restored.create_node(Properties::new()).expect("create");
        assert!(d > c);
    }

    #[test]
    fn load_preserves_edges_and_types() {
        let (graph, a, b) = sample_graph();
        let bytes = graph_to_bytes(&graph).expect("serialize");
        let restored = graph_from_bytes(&bytes).expect("deserialize");

        assert!(restored.are_connected(a, b, "member").expect("check"));
        assert_eq!(
            restored.resolve_edge_type("member").expect("resolve"),
            graph.resolve_edge_type("member").expect("resolve")
        );
        assert_eq!(
            restored.outbound(a, "member").expect("out"),
            vec![(b, EdgeWeight::new(0.5))]
        );
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[0..4].copy_from_slice(b"XXXX");

        assert!(matches!(
            graph_from_bytes(&bytes),
            Err(HawthornError::SerializationError(_))
        ));
    }

    #[test]
    fn unsupported_version_rejected() {
        let (graph, _, _) = sample_graph();
        let mut bytes = graph_to_bytes(&graph).expect("serialize");
        bytes[4] = primitives::FORMAT_VERSION.wrapping_add(1);

        let err = graph_from_bytes(&bytes).expect_err("version must be checked");
        assert!(err.to_string().contains("Unsupported version"));
    }

    #[test]
    fn truncated_data_rejected() {
        assert!(graph_from_bytes(b"HAW").is_err());

        let (graph, _, _) = sample_graph();
        let bytes = graph_to_bytes(&graph).expect("serialize");
        assert!(graph_from_bytes(&bytes[..bytes.len() - 3]).is_err());
    }

    #[test]
    fn dangling_edge_rejected() {
        let (graph, _, _) = sample_graph();
        let mut snapshot = SerializableGraph::from(&graph);
        snapshot.edges.push((1, 99, 1, 1.0));

        let payload = postcard::to_stdvec(&snapshot).expect("encode");
        let mut bytes = PersistenceHeader::new().to_bytes().to_vec();
        bytes.extend_from_slice(&payload);

        assert!(matches!(
            graph_from_bytes(&bytes),
            Err(HawthornError::NodeNotFound(NodeId(99)))
        ));
    }

    #[test]
    fn restored_max_node_id_is_never_reissued() {
        let mut props = Properties::new();
        props.insert("type".to_string(), "group".to_string());
        let snapshot = SerializableGraph {
            nodes: vec![crate::SerializableNode {
                id: u64::MAX,
                properties: props,
            }],
            edge_types: Vec::new(),
            edges: Vec::new(),
            next_node_id: u64::MAX,
        };

        let payload = postcard::to_stdvec(&snapshot).expect("encode");
        let mut bytes = PersistenceHeader::new().to_bytes().to_vec();
        bytes.extend_from_slice(&payload);
        let mut graph = graph_from_bytes(&bytes).expect("load");

        assert!(matches!(
            graph.create_node(Properties::new()),
            Err(HawthornError::NodeIdLimit(_))
        ));
        let max = NodeId(u64::MAX);
        assert_eq!(
            graph.get_property(max, "type").expect("get").as_deref(),
            Some("group")
        );
        assert_eq!(graph.find("type", "group"), vec![max]);
        assert_eq!(graph.node_count(), 1);
    }
}
