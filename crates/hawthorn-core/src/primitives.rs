//! # Engine Primitives
//!
//! Hardcoded constants for the Hawthorn engine.
//!
//! These are compiled into the binary and are immutable at runtime.

/// Weight given to an edge when the caller does not specify one.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// The first node id handed out by a fresh store.
pub const FIRST_NODE_ID: u64 = 1;

/// The first edge type id handed out by a fresh registry.
///
/// Id 0 is reserved and never assigned.
pub const FIRST_EDGE_TYPE_ID: u16 = 1;

/// Magic bytes for the Hawthorn snapshot header.
///
/// - Snapshot Header = Magic Bytes ("HAWT") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"HAWT";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the snapshot tables.
pub const FORMAT_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_type_zero_is_reserved() {
        assert_eq!(FIRST_EDGE_TYPE_ID, 1);
    }

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"HAWT");
    }
}
