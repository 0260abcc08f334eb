// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory schema model.
//!
//! A [`SchemaNode`] is either an inline body (object, array, primitive, enum)
//! or a [`SchemaNode::Reference`] that carries nothing but the name of a
//! registry entry. Keeping the reference variant body-less makes the
//! "references never embed a body" rule a property of the type.
//!
//! Equality is structural and is used by `ModelConverters::read` to pick the
//! registry entries that match the root resolution.

mod emit;
mod resolved;

pub use emit::DEFAULT_REFERENCE_PREFIX;
pub use resolved::ResolvedSchema;

use std::collections::HashMap;

use indexmap::IndexMap;

/// Kind tag of a [`SchemaNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Object,
    Array,
    Primitive,
    Enum,
    Reference,
}

/// Primitive subtype, following the JSON Schema type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Integer,
    Number,
    String,
    Boolean,
}

impl PrimitiveType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }
}

/// Annotations shared by every inline node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMeta {
    /// Registry name, set when the node is registered rather than inlined.
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub nullable: bool,
    pub read_only: bool,
    pub deprecated: bool,
    pub example: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub meta: SchemaMeta,
    /// Properties in declaration order.
    pub properties: IndexMap<String, SchemaNode>,
    pub required: Vec<String>,
    /// Value schema for map-like objects.
    pub additional_properties: Option<Box<SchemaNode>>,
}

impl ObjectSchema {
    /// Append a property; `required` also records it in the required list.
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        node: SchemaNode,
        required: bool,
    ) -> Self {
        self.insert_property(name, node, required);
        self
    }

    pub fn insert_property(&mut self, name: impl Into<String>, node: SchemaNode, required: bool) {
        let name = name.into();
        if required && !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, node);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub meta: SchemaMeta,
    pub items: Box<SchemaNode>,
    pub unique_items: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    pub meta: SchemaMeta,
    pub ty: PrimitiveType,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumSchema {
    pub meta: SchemaMeta,
    pub values: Vec<String>,
}

/// Resolved description of one type.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object(ObjectSchema),
    Array(ArraySchema),
    Primitive(PrimitiveSchema),
    Enum(EnumSchema),
    /// Deferred to the registry entry with this name.
    Reference(String),
}

impl SchemaNode {
    pub fn object() -> ObjectSchema {
        ObjectSchema::default()
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::Array(ArraySchema {
            meta: SchemaMeta::default(),
            items: Box::new(items),
            unique_items: false,
        })
    }

    pub fn primitive(ty: PrimitiveType, format: Option<&str>) -> Self {
        Self::Primitive(PrimitiveSchema {
            meta: SchemaMeta {
                format: format.map(str::to_string),
                ..SchemaMeta::default()
            },
            ty,
        })
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(EnumSchema {
            meta: SchemaMeta::default(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Object(_) => SchemaKind::Object,
            Self::Array(_) => SchemaKind::Array,
            Self::Primitive(_) => SchemaKind::Primitive,
            Self::Enum(_) => SchemaKind::Enum,
            Self::Reference(_) => SchemaKind::Reference,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// Object and enum bodies are registered by name; everything else is inlined.
    pub fn is_registrable(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Enum(_))
    }

    /// Registry name of an inline node, if it has been registered.
    pub fn name(&self) -> Option<&str> {
        self.meta().and_then(|m| m.name.as_deref())
    }

    /// Target name of a reference node.
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Self::Reference(name) => Some(name),
            _ => None,
        }
    }

    pub fn meta(&self) -> Option<&SchemaMeta> {
        match self {
            Self::Object(s) => Some(&s.meta),
            Self::Array(s) => Some(&s.meta),
            Self::Primitive(s) => Some(&s.meta),
            Self::Enum(s) => Some(&s.meta),
            Self::Reference(_) => None,
        }
    }

    pub fn meta_mut(&mut self) -> Option<&mut SchemaMeta> {
        match self {
            Self::Object(s) => Some(&mut s.meta),
            Self::Array(s) => Some(&mut s.meta),
            Self::Primitive(s) => Some(&mut s.meta),
            Self::Enum(s) => Some(&mut s.meta),
            Self::Reference(_) => None,
        }
    }

    /// Visit every reference name in this subtree, depth first.
    pub fn walk_references<F: FnMut(&str)>(&self, visit: &mut F) {
        match self {
            Self::Reference(name) => visit(name),
            Self::Object(obj) => {
                for child in obj.properties.values() {
                    child.walk_references(visit);
                }
                if let Some(extra) = &obj.additional_properties {
                    extra.walk_references(visit);
                }
            }
            Self::Array(arr) => arr.items.walk_references(visit),
            Self::Primitive(_) | Self::Enum(_) => {}
        }
    }

    /// Rewrite reference targets and the node's own registry name through `names`.
    /// Names missing from the map are kept.
    pub fn rename_references(&mut self, names: &HashMap<String, String>) {
        if let Some(meta) = self.meta_mut() {
            if let Some(renamed) = meta.name.as_ref().and_then(|n| names.get(n)) {
                meta.name = Some(renamed.clone());
            }
        }
        match self {
            Self::Reference(name) => {
                if let Some(renamed) = names.get(name.as_str()) {
                    *name = renamed.clone();
                }
            }
            Self::Object(obj) => {
                for child in obj.properties.values_mut() {
                    child.rename_references(names);
                }
                if let Some(extra) = obj.additional_properties.as_mut() {
                    extra.rename_references(names);
                }
            }
            Self::Array(arr) => arr.items.rename_references(names),
            Self::Primitive(_) | Self::Enum(_) => {}
        }
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(value: ObjectSchema) -> Self {
        Self::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_like() -> SchemaNode {
        SchemaNode::object()
            .with_property("id", SchemaNode::primitive(PrimitiveType::Integer, Some("int64")), true)
            .with_property("items", SchemaNode::array(SchemaNode::reference("Order")), true)
            .with_property("owner", SchemaNode::reference("Customer"), false)
            .into()
    }

    #[test]
    fn test_kind_and_registrable() {
        assert_eq!(order_like().kind(), SchemaKind::Object);
        assert!(order_like().is_registrable());
        assert!(SchemaNode::enumeration(["A", "B"]).is_registrable());
        assert!(!SchemaNode::array(SchemaNode::reference("X")).is_registrable());
        assert!(!SchemaNode::reference("X").is_registrable());
        assert!(SchemaNode::reference("X").meta().is_none());
    }

    #[test]
    fn test_required_is_deduplicated() {
        let mut obj = SchemaNode::object();
        obj.insert_property("id", SchemaNode::primitive(PrimitiveType::Integer, None), true);
        obj.insert_property("id", SchemaNode::primitive(PrimitiveType::Integer, None), true);
        assert_eq!(obj.required, vec!["id".to_string()]);
        assert_eq!(obj.properties.len(), 1);
    }

    #[test]
    fn test_walk_references_visits_nested_nodes() {
        let mut seen = Vec::new();
        order_like().walk_references(&mut |name| seen.push(name.to_string()));
        assert_eq!(seen, vec!["Order".to_string(), "Customer".to_string()]);
    }

    #[test]
    fn test_rename_references() {
        let mut node = order_like();
        if let Some(meta) = node.meta_mut() {
            meta.name = Some("acme.Order".into());
        }
        let names = HashMap::from([
            ("Order".to_string(), "shop.Order".to_string()),
            ("acme.Order".to_string(), "Order".to_string()),
        ]);
        node.rename_references(&names);

        let mut seen = Vec::new();
        node.walk_references(&mut |name| seen.push(name.to_string()));
        assert_eq!(seen, vec!["shop.Order".to_string(), "Customer".to_string()]);
        assert_eq!(node.name(), Some("Order"));
    }
}
