// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Baseline converter.
//!
//! Translates every [`TypeShape`] the provider knows into a schema node.
//! Sits at the end of the default chain; custom converters are inserted in
//! front of it and fall back to it by declining.

use super::{ModelConverter, Resolution};
use crate::context::ResolutionContext;
use crate::descriptor::TypeDescriptor;
use crate::error::ResolveError;
use crate::metadata::{keys, Metadata};
use crate::provider::{MemberShape, TypeShape};
use crate::schema::SchemaNode;

/// Converter name reported in logs and faults.
pub const MODEL_RESOLVER_NAME: &str = "model-resolver";

/// Shape-driven converter backed by the session's [`TypeProvider`](crate::TypeProvider).
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelResolver;

impl ModelResolver {
    pub fn new() -> Self {
        Self
    }

    fn resolve_struct(
        &self,
        members: &[MemberShape],
        metadata: &Metadata,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<SchemaNode, ResolveError> {
        let mut object = SchemaNode::object();
        for member in members {
            if member.metadata.flag(keys::HIDDEN) == Some(true) {
                continue;
            }
            let property = member
                .metadata
                .get(keys::RENAME)
                .filter(|name| !name.is_empty())
                .unwrap_or(member.name.as_str());

            let mut node = ctx.resolve_property(&member.ty)?;
            member.metadata.apply_to(&mut node);

            let optional = matches!(
                ctx.provider().describe(&member.ty),
                Some(TypeShape::Optional { .. })
            );
            let required = member.metadata.flag(keys::REQUIRED).unwrap_or(!optional);
            object.insert_property(property, node, required);
        }

        let mut node = SchemaNode::from(object);
        apply_type_metadata(metadata, &mut node);
        Ok(node)
    }
}

/// Type-level annotations; member-only keys such as `read_only` are ignored.
fn apply_type_metadata(metadata: &Metadata, node: &mut SchemaNode) {
    let Some(meta) = node.meta_mut() else {
        return;
    };
    if let Some(description) = metadata.get(keys::DESCRIPTION) {
        meta.description = Some(description.to_string());
    }
    if let Some(title) = metadata.get(keys::TITLE) {
        meta.title = Some(title.to_string());
    }
    if let Some(deprecated) = metadata.flag(keys::DEPRECATED) {
        meta.deprecated = deprecated;
    }
}

impl ModelConverter for ModelResolver {
    fn name(&self) -> &str {
        MODEL_RESOLVER_NAME
    }

    fn resolve(
        &self,
        ty: &TypeDescriptor,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Resolution, ResolveError> {
        let Some(shape) = ctx.provider().describe(ty) else {
            log::trace!("[typeschema] provider has no shape for '{}'", ty);
            return Ok(Resolution::Declined);
        };

        let node = match shape {
            TypeShape::Scalar(scalar) => {
                let (primitive, format) = scalar.schema_type();
                SchemaNode::primitive(primitive, format)
            }
            TypeShape::Sequence { element, unique } => {
                let items = ctx.resolve_property(&element)?;
                let mut node = SchemaNode::array(items);
                if let SchemaNode::Array(array) = &mut node {
                    array.unique_items = unique;
                }
                node
            }
            TypeShape::Map { key, value } => {
                if ctx.provider().describe(&key).is_none() {
                    log::trace!("[typeschema] map key '{}' of '{}' is unknown", key, ty);
                }
                let mut object = SchemaNode::object();
                object.additional_properties = Some(Box::new(ctx.resolve_property(&value)?));
                object.into()
            }
            // A registered inner type stays a plain reference: the parent's
            // `required` list is then the only trace of optionality.
            TypeShape::Optional { inner } => {
                let mut node = ctx.resolve_property(&inner)?;
                if let Some(meta) = node.meta_mut() {
                    meta.nullable = true;
                }
                node
            }
            TypeShape::Struct { members, metadata } => {
                self.resolve_struct(&members, &metadata, ctx)?
            }
            TypeShape::Enum { values, metadata } => {
                let mut node = SchemaNode::enumeration(values);
                apply_type_metadata(&metadata, &mut node);
                node
            }
        };
        Ok(Resolution::Resolved(node))
    }
}
