//! # Formats
//!
//! Byte-level encodings of a graph. Reading and writing files is left to
//! the caller.

pub mod persistence;

pub use persistence::{
    MAX_PERSISTENCE_PAYLOAD_SIZE, PersistenceHeader, graph_from_bytes, graph_to_bytes,
};
