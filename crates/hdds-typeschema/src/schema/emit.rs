// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OpenAPI-style JSON emission of schema nodes.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::{SchemaMeta, SchemaNode};

/// Prefix prepended to reference names in `$ref` values.
pub const DEFAULT_REFERENCE_PREFIX: &str = "#/components/schemas/";

impl SchemaNode {
    /// Render as a JSON Schema / OpenAPI object, references as `{"$ref": prefix + name}`.
    pub fn to_json(&self, reference_prefix: &str) -> Value {
        let mut out = Map::new();
        match self {
            SchemaNode::Reference(name) => {
                out.insert("$ref".into(), Value::String(format!("{reference_prefix}{name}")));
                return Value::Object(out);
            }
            SchemaNode::Object(obj) => {
                out.insert("type".into(), json!("object"));
                if !obj.properties.is_empty() {
                    let props: Map<String, Value> = obj
                        .properties
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_json(reference_prefix)))
                        .collect();
                    out.insert("properties".into(), Value::Object(props));
                }
                if !obj.required.is_empty() {
                    out.insert("required".into(), json!(obj.required));
                }
                if let Some(extra) = &obj.additional_properties {
                    out.insert("additionalProperties".into(), extra.to_json(reference_prefix));
                }
            }
            SchemaNode::Array(arr) => {
                out.insert("type".into(), json!("array"));
                out.insert("items".into(), arr.items.to_json(reference_prefix));
                if arr.unique_items {
                    out.insert("uniqueItems".into(), Value::Bool(true));
                }
            }
            SchemaNode::Primitive(p) => {
                out.insert("type".into(), json!(p.ty.as_str()));
            }
            SchemaNode::Enum(e) => {
                out.insert("type".into(), json!("string"));
                out.insert("enum".into(), json!(e.values));
            }
        }
        if let Some(meta) = self.meta() {
            write_meta(meta, &mut out);
        }
        Value::Object(out)
    }
}

fn write_meta(meta: &SchemaMeta, out: &mut Map<String, Value>) {
    if let Some(format) = &meta.format {
        out.insert("format".into(), json!(format));
    }
    if let Some(title) = &meta.title {
        out.insert("title".into(), json!(title));
    }
    if let Some(description) = &meta.description {
        out.insert("description".into(), json!(description));
    }
    if meta.nullable {
        out.insert("nullable".into(), Value::Bool(true));
    }
    if meta.read_only {
        out.insert("readOnly".into(), Value::Bool(true));
    }
    if meta.deprecated {
        out.insert("deprecated".into(), Value::Bool(true));
    }
    if let Some(example) = &meta.example {
        out.insert("example".into(), example.clone());
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json(DEFAULT_REFERENCE_PREFIX).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveType;

    #[test]
    fn test_reference_renders_as_ref() {
        let node = SchemaNode::reference("Order");
        assert_eq!(
            serde_json::to_value(&node).expect("serialize"),
            json!({"$ref": "#/components/schemas/Order"})
        );
        assert_eq!(node.to_json("#/definitions/"), json!({"$ref": "#/definitions/Order"}));
    }

    #[test]
    fn test_object_rendering() {
        let mut node: SchemaNode = SchemaNode::object()
            .with_property("id", SchemaNode::primitive(PrimitiveType::Integer, Some("int32")), true)
            .with_property("items", SchemaNode::array(SchemaNode::reference("Order")), false)
            .into();
        if let Some(meta) = node.meta_mut() {
            meta.description = Some("An order".into());
        }

        assert_eq!(
            node.to_json(DEFAULT_REFERENCE_PREFIX),
            json!({
                "type": "object",
                "description": "An order",
                "properties": {
                    "id": {"type": "integer", "format": "int32"},
                    "items": {"type": "array", "items": {"$ref": "#/components/schemas/Order"}}
                },
                "required": ["id"]
            })
        );
    }

    #[test]
    fn test_enum_rendering() {
        let node = SchemaNode::enumeration(["PENDING", "SHIPPED"]);
        assert_eq!(
            node.to_json(DEFAULT_REFERENCE_PREFIX),
            json!({"type": "string", "enum": ["PENDING", "SHIPPED"]})
        );
    }
}
