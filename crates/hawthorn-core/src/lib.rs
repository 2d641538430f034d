//! # hawthorn-core
//!
//! The in-memory property graph engine for Hawthorn.
//!
//! Nodes carry string-to-string property maps and are found through an
//! exact-match property index. Edges are directed, weighted and typed; a
//! type is a name registered on first use. A chainable query builder walks
//! the graph from a property lookup or a known node, and its `crawl` step
//! computes the transitive closure over a set of edge types.
//!
//! ## Layout
//!
//! - `nodes`, `index`, `registry`, `edges`: the four stores
//! - `graph`: `Graph`, the only writer of those stores
//! - `query`: the traversal builder and crawl bounds
//! - `shared`: a lock-guarded handle for concurrent callers
//! - `formats`: snapshot bytes in, bytes out
//!
//! ## Constraints
//!
//! - Deterministic: `BTreeMap`/`BTreeSet` only, stable result order
//! - No async, no network, no file I/O
//! - No `unwrap`, no panics in library code

// =============================================================================
// MODULES
// =============================================================================

pub mod edges;
pub mod formats;
pub mod graph;
pub mod index;
pub mod nodes;
pub mod primitives;
pub mod query;
pub mod registry;
pub mod shared;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CrawlBound, Edge, EdgeTypeId, EdgeWeight, HawthornError, NodeId, Properties};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use edges::EdgeStore;
pub use graph::{Graph, GraphStore, SerializableGraph, SerializableNode};
pub use index::PropertyIndex;
pub use nodes::NodeStore;
pub use query::{CrawlLimits, Query};
pub use registry::EdgeTypeRegistry;
pub use shared::SharedGraph;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{PersistenceHeader, graph_from_bytes, graph_to_bytes};
