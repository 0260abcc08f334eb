// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Result of a top-level resolution.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use super::emit::DEFAULT_REFERENCE_PREFIX;
use super::SchemaNode;

/// Root schema plus every named schema discovered while resolving it.
///
/// A successful resolution always satisfies the closure property: each
/// reference reachable from `schema` or from any registry entry names a key of
/// `referenced_schemas`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub schema: SchemaNode,
    /// Registry, sorted by name.
    pub referenced_schemas: BTreeMap<String, SchemaNode>,
}

impl ResolvedSchema {
    pub fn new(schema: SchemaNode, referenced_schemas: BTreeMap<String, SchemaNode>) -> Self {
        Self {
            schema,
            referenced_schemas,
        }
    }

    /// Every reference name reachable from the root or from any registry entry.
    pub fn reference_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut collect = |name: &str| {
            names.insert(name.to_string());
        };
        self.schema.walk_references(&mut collect);
        for entry in self.referenced_schemas.values() {
            entry.walk_references(&mut collect);
        }
        names
    }

    /// Reference names with no registry entry. Empty iff the closure holds.
    pub fn dangling_references(&self) -> BTreeSet<String> {
        self.reference_names()
            .into_iter()
            .filter(|name| !self.referenced_schemas.contains_key(name))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.referenced_schemas.get(name)
    }

    /// `{"schema": ..., "components": {"schemas": {...}}}`.
    pub fn to_json(&self, reference_prefix: &str) -> Value {
        let schemas: serde_json::Map<String, Value> = self
            .referenced_schemas
            .iter()
            .map(|(name, node)| (name.clone(), node.to_json(reference_prefix)))
            .collect();
        json!({
            "schema": self.schema.to_json(reference_prefix),
            "components": { "schemas": schemas },
        })
    }
}

impl Serialize for ResolvedSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json(DEFAULT_REFERENCE_PREFIX).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveType;

    fn node_referencing(names: &[&str]) -> SchemaNode {
        let mut obj = SchemaNode::object();
        for name in names {
            obj.insert_property(name.to_lowercase(), SchemaNode::reference(*name), false);
        }
        obj.insert_property("id", SchemaNode::primitive(PrimitiveType::Integer, None), true);
        obj.into()
    }

    #[test]
    fn test_closed_registry_has_no_dangling_references() {
        let resolved = ResolvedSchema::new(
            node_referencing(&["Customer"]),
            BTreeMap::from([("Customer".to_string(), node_referencing(&["Customer"]))]),
        );
        assert!(resolved.dangling_references().is_empty());
        assert_eq!(
            resolved.reference_names(),
            BTreeSet::from(["Customer".to_string()])
        );
    }

    #[test]
    fn test_dangling_reference_inside_registry_entry_is_reported() {
        let resolved = ResolvedSchema::new(
            node_referencing(&["Customer"]),
            BTreeMap::from([("Customer".to_string(), node_referencing(&["Address"]))]),
        );
        assert_eq!(
            resolved.dangling_references(),
            BTreeSet::from(["Address".to_string()])
        );
    }

    #[test]
    fn test_document_layout() {
        let resolved = ResolvedSchema::new(
            SchemaNode::reference("Customer"),
            BTreeMap::from([("Customer".to_string(), node_referencing(&[]))]),
        );
        let doc = serde_json::to_value(&resolved).expect("serialize");
        assert_eq!(doc["schema"]["$ref"], "#/components/schemas/Customer");
        assert_eq!(doc["components"]["schemas"]["Customer"]["type"], "object");
    }
}
