//! # Edge Type Registry
//!
//! Bidirectional mapping between edge type names and small integer ids.
//!
//! Ids are assigned on first use by a connect and never change afterwards.
//! There is no way to unregister a type.

use crate::primitives::FIRST_EDGE_TYPE_ID;
use crate::{EdgeTypeId, HawthornError};
use std::collections::BTreeMap;

/// Name <-> id table, owned by one store instance.
#[derive(Debug, Clone, Default)]
pub struct EdgeTypeRegistry {
    by_name: BTreeMap<String, EdgeTypeId>,
    by_id: BTreeMap<EdgeTypeId, String>,
}

impl EdgeTypeRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a type id, registering the name with a fresh id if unseen.
    ///
    /// A fresh id is the largest assigned id plus one, starting at 1.
    pub fn resolve_or_create(&mut self, name: &str) -> Result<EdgeTypeId, HawthornError> {
        if let Some(&id) = self.by_name.get(name) {
            return Ok(id);
        }

        let next = match self.by_id.last_key_value() {
            Some((last, _)) => last
                .0
                .checked_add(1)
                .ok_or(HawthornError::EdgeTypeLimit(self.by_id.len()))?,
            None => FIRST_EDGE_TYPE_ID,
        };
        let id = EdgeTypeId(next);

        tracing::debug!(edge_type = name, id = id.0, "registered edge type");
        self.by_name.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
        Ok(id)
    }

    /// Look up a registered type id.
    pub fn resolve(&self, name: &str) -> Result<EdgeTypeId, HawthornError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| HawthornError::UnknownEdgeType(name.to_string()))
    }

    /// Reverse lookup.
    #[must_use]
    pub fn name(&self, id: EdgeTypeId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Re-register a name under its original id (snapshot restore).
    ///
    /// Rejects a restore that would break the bijection.
    pub(crate) fn restore(&mut self, id: EdgeTypeId, name: &str) -> Result<(), HawthornError> {
        if id.0 < FIRST_EDGE_TYPE_ID {
            return Err(HawthornError::SerializationError(
                "Edge type id 0 is reserved".to_string(),
            ));
        }
        let clashes_name = self.by_name.get(name).is_some_and(|&existing| existing != id);
        let clashes_id = self.by_id.get(&id).is_some_and(|existing| existing != name);
        if clashes_name || clashes_id {
            return Err(HawthornError::SerializationError(format!(
                "Conflicting edge type entry: {} -> {}",
                name, id.0
            )));
        }
        self.by_name.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
        Ok(())
    }

    /// All registered types in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeTypeId, &str)> + '_ {
        self.by_id.iter().map(|(id, name)| (*id, name.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one() {
        let mut registry = EdgeTypeRegistry::new();
        assert_eq!(
            registry.resolve_or_create("read").expect("create"),
            EdgeTypeId(1)
        );
        assert_eq!(
            registry.resolve_or_create("write").expect("create"),
            EdgeTypeId(2)
        );
    }

    #[test]
    fn ids_are_stable() {
        let mut registry = EdgeTypeRegistry::new();
        let first = registry.resolve_or_create("read").expect("create");
        registry.resolve_or_create("write").expect("create");
        let again = registry.resolve_or_create("read").expect("create");

        assert_eq!(first, again);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_unknown_fails() {
        let registry = EdgeTypeRegistry::new();
        assert!(matches!(
            registry.resolve("read"),
            Err(HawthornError::UnknownEdgeType(name)) if name == "read"
        ));
    }

    #[test]
    fn name_is_inverse_of_resolve() {
        let mut registry = EdgeTypeRegistry::new();
        let id = registry.resolve_or_create("belongs_to").expect("create");
        assert_eq!(registry.name(id), Some("belongs_to"));
        assert_eq!(registry.name(EdgeTypeId(0)), None);
    }

    #[test]
    fn next_id_follows_largest_restored() {
        let mut registry = EdgeTypeRegistry::new();
        registry.restore(EdgeTypeId(7), "read").expect("restore");
        assert_eq!(
            registry.resolve_or_create("write").expect("create"),
            EdgeTypeId(8)
        );
    }

    #[test]
    fn restore_rejects_conflicts() {
        let mut registry = EdgeTypeRegistry::new();
        registry.restore(EdgeTypeId(1), "read").expect("restore");
        assert!(registry.restore(EdgeTypeId(2), "read").is_err());
        assert!(registry.restore(EdgeTypeId(1), "write").is_err());
        assert!(registry.restore(EdgeTypeId(0), "zero").is_err());
    }

    #[test]
    fn exhausted_id_space_is_an_error() {
        let mut registry = EdgeTypeRegistry::new();
        registry.restore(EdgeTypeId(u16::MAX), "last").expect("restore");
        assert!(matches!(
            registry.resolve_or_create("one_more"),
            Err(HawthornError::EdgeTypeLimit(1))
        ));
    }
}
