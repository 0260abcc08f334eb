// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-description provider interface.
//!
//! The resolution engine does not know how types are declared. It asks a
//! [`TypeProvider`] for the shape of each descriptor: which members a struct
//! has, what a collection holds, whether a type is a language primitive.
//! [`TypeCatalog`] is the in-memory implementation used by the CLI and tests.

mod catalog;

pub use catalog::{
    CatalogError, DefinitionKind, MemberDefinition, TypeCatalog, TypeDefinition,
    COLLECTIONS_NAMESPACE, CORE_NAMESPACE,
};

use serde::{Deserialize, Serialize};

use crate::descriptor::TypeDescriptor;
use crate::metadata::Metadata;
use crate::schema::PrimitiveType;

/// Leaf value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Char,
    String,
    Bytes,
    Date,
    DateTime,
    Uuid,
    Decimal,
}

impl ScalarKind {
    /// JSON Schema type and format for this scalar.
    pub const fn schema_type(self) -> (PrimitiveType, Option<&'static str>) {
        match self {
            Self::Bool => (PrimitiveType::Boolean, None),
            Self::Int8 | Self::Int16 | Self::Int32 => (PrimitiveType::Integer, Some("int32")),
            Self::UInt8 | Self::UInt16 => (PrimitiveType::Integer, Some("int32")),
            Self::UInt32 | Self::Int64 | Self::UInt64 => (PrimitiveType::Integer, Some("int64")),
            Self::Float32 => (PrimitiveType::Number, Some("float")),
            Self::Float64 => (PrimitiveType::Number, Some("double")),
            Self::Decimal => (PrimitiveType::Number, None),
            Self::Char | Self::String => (PrimitiveType::String, None),
            Self::Bytes => (PrimitiveType::String, Some("byte")),
            Self::Date => (PrimitiveType::String, Some("date")),
            Self::DateTime => (PrimitiveType::String, Some("date-time")),
            Self::Uuid => (PrimitiveType::String, Some("uuid")),
        }
    }
}

/// One member of a struct shape, with generic arguments already substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberShape {
    pub name: String,
    pub ty: TypeDescriptor,
    pub metadata: Metadata,
}

/// What a descriptor looks like, as far as schema generation is concerned.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Scalar(ScalarKind),
    Struct {
        members: Vec<MemberShape>,
        metadata: Metadata,
    },
    Enum {
        values: Vec<String>,
        metadata: Metadata,
    },
    Sequence {
        element: TypeDescriptor,
        /// Set semantics.
        unique: bool,
    },
    Map {
        key: TypeDescriptor,
        value: TypeDescriptor,
    },
    Optional {
        inner: TypeDescriptor,
    },
}

/// Source of type information for a resolution session.
///
/// Implementations must be deterministic: describing the same descriptor twice
/// yields the same shape.
pub trait TypeProvider: Send + Sync {
    /// Shape of `ty`, or `None` if the provider does not know it.
    fn describe(&self, ty: &TypeDescriptor) -> Option<TypeShape>;

    /// Language primitives are never resolved at the root.
    fn is_primitive(&self, ty: &TypeDescriptor) -> bool;
}

impl<P: TypeProvider + ?Sized> TypeProvider for &P {
    fn describe(&self, ty: &TypeDescriptor) -> Option<TypeShape> {
        (**self).describe(ty)
    }

    fn is_primitive(&self, ty: &TypeDescriptor) -> bool {
        (**self).is_primitive(ty)
    }
}

impl<P: TypeProvider + ?Sized> TypeProvider for std::sync::Arc<P> {
    fn describe(&self, ty: &TypeDescriptor) -> Option<TypeShape> {
        (**self).describe(ty)
    }

    fn is_primitive(&self, ty: &TypeDescriptor) -> bool {
        (**self).is_primitive(ty)
    }
}
