// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory type catalog.
//!
//! A [`TypeCatalog`] holds type definitions keyed by qualified name. Generic
//! definitions declare parameter names; [`TypeProvider::describe`] substitutes
//! the descriptor's arguments into member and element types.
//!
//! # Document format
//!
//! ```toml
//! [[types]]
//! name = "acme.shop.Page"
//! params = ["T"]
//! kind = "struct"
//! metadata = [{ key = "description", value = "One page of results" }]
//!
//! [[types.members]]
//! name = "items"
//! type = "collections.List<T>"
//!
//! [[types.members]]
//! name = "total"
//! type = "i64"
//!
//! [[types]]
//! name = "acme.shop.Status"
//! kind = "enum"
//! values = ["PENDING", "SHIPPED"]
//! ```
//!
//! The same structure is accepted as JSON.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{MemberShape, ScalarKind, TypeProvider, TypeShape};
use crate::descriptor::{DescriptorError, TypeDescriptor};
use crate::metadata::Metadata;

/// Namespace of the built-in non-primitive scalars (`core.String`, ...).
pub const CORE_NAMESPACE: &str = "core";
/// Namespace of the built-in collection types (`collections.List`, ...).
pub const COLLECTIONS_NAMESPACE: &str = "collections";

/// Catalog loading and validation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid type name '{name}': {source}")]
    Descriptor {
        name: String,
        #[source]
        source: DescriptorError,
    },

    #[error("type '{0}' is defined twice")]
    Duplicate(String),

    #[error("invalid definition of '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

/// Struct member as written in a catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl MemberDefinition {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Body of a definition, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefinitionKind {
    Struct {
        #[serde(default)]
        members: Vec<MemberDefinition>,
    },
    Enum {
        values: Vec<String>,
    },
    Scalar {
        scalar: ScalarKind,
        /// Language primitive (filtered at the root by the facade).
        #[serde(default)]
        primitive: bool,
    },
    Sequence {
        element: TypeDescriptor,
        #[serde(default)]
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

/// One named type, possibly generic over `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(flatten)]
    pub kind: DefinitionKind,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, kind: DefinitionKind) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            kind,
            metadata: Metadata::new(),
        }
    }

    pub fn structure(name: impl Into<String>, members: Vec<MemberDefinition>) -> Self {
        Self::new(name, DefinitionKind::Struct { members })
    }

    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            DefinitionKind::Enum {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Descriptors this definition mentions, with parameters left unsubstituted.
    fn mentioned_types(&self) -> Vec<&TypeDescriptor> {
        match &self.kind {
            DefinitionKind::Struct { members } => members.iter().map(|m| &m.ty).collect(),
            DefinitionKind::Sequence { element, .. } => vec![element],
            DefinitionKind::Map { key, value } => vec![key, value],
            DefinitionKind::Optional { inner } => vec![inner],
            DefinitionKind::Enum { .. } | DefinitionKind::Scalar { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct CatalogDocument {
    #[serde(default)]
    types: Vec<TypeDefinition>,
}

/// In-memory [`TypeProvider`].
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    definitions: HashMap<String, TypeDefinition>,
}

impl TypeCatalog {
    /// Empty catalog, without built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with primitives, `core.*` scalars and
    /// `collections.*` generics.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for def in builtin_definitions() {
            catalog.definitions.insert(def.name.clone(), def);
        }
        catalog
    }

    /// Built-ins plus the definitions of a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = toml::from_str(content)?;
        Self::from_document(doc)
    }

    /// Built-ins plus the definitions of a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(content)?;
        Self::from_document(doc)
    }

    /// Load a `.json` or `.toml` document (anything not ending in `.json` is read as TOML).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    fn from_document(doc: CatalogDocument) -> Result<Self, CatalogError> {
        let mut catalog = Self::with_builtins();
        for def in doc.types {
            catalog.define(def)?;
        }
        log::debug!(
            "[typeschema] catalog loaded with {} definitions",
            catalog.definitions.len()
        );
        Ok(catalog)
    }

    /// Add a definition after validating it.
    pub fn define(&mut self, def: TypeDefinition) -> Result<(), CatalogError> {
        let parsed: TypeDescriptor =
            def.name
                .parse()
                .map_err(|source| CatalogError::Descriptor {
                    name: def.name.clone(),
                    source,
                })?;
        if parsed.is_generic() {
            return Err(invalid(&def.name, "type parameters belong in `params`"));
        }
        if self.definitions.contains_key(&def.name) {
            return Err(CatalogError::Duplicate(def.name));
        }

        let mut seen = HashSet::new();
        for param in &def.params {
            if param.is_empty() || param.contains('.') || param.contains('<') {
                return Err(invalid(&def.name, &format!("bad type parameter '{param}'")));
            }
            if !seen.insert(param.as_str()) {
                return Err(invalid(&def.name, &format!("duplicate type parameter '{param}'")));
            }
        }

        match &def.kind {
            DefinitionKind::Struct { members } => {
                let mut names = HashSet::new();
                for member in members {
                    if member.name.is_empty() {
                        return Err(invalid(&def.name, "member with empty name"));
                    }
                    if !names.insert(member.name.as_str()) {
                        return Err(invalid(
                            &def.name,
                            &format!("duplicate member '{}'", member.name),
                        ));
                    }
                }
            }
            DefinitionKind::Enum { values } if values.is_empty() => {
                return Err(invalid(&def.name, "enum without values"));
            }
            _ => {}
        }

        self.definitions.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// All definition names (sorted for determinism).
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Mentioned types with no definition, keyed by the definition mentioning them.
    ///
    /// Type parameters of the mentioning definition are not reported.
    pub fn unresolved_references(&self) -> BTreeMap<String, Vec<String>> {
        let mut missing: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for def in self.definitions.values() {
            let params: HashSet<&str> = def.params.iter().map(String::as_str).collect();
            let mut stack: Vec<&TypeDescriptor> = def.mentioned_types();
            while let Some(ty) = stack.pop() {
                stack.extend(ty.args());
                let path = ty.qualified_name();
                if (!ty.is_generic() && params.contains(path)) || self.contains(path) {
                    continue;
                }
                let entry = missing.entry(def.name.clone()).or_default();
                if !entry.iter().any(|m| m == path) {
                    entry.push(path.to_string());
                }
            }
        }
        for entries in missing.values_mut() {
            entries.sort();
        }
        missing
    }

    fn bind<'a>(
        def: &'a TypeDefinition,
        ty: &'a TypeDescriptor,
    ) -> Option<HashMap<&'a str, &'a TypeDescriptor>> {
        if def.params.len() != ty.args().len() {
            return None;
        }
        Some(
            def.params
                .iter()
                .map(String::as_str)
                .zip(ty.args().iter())
                .collect(),
        )
    }
}

fn substitute(ty: &TypeDescriptor, bindings: &HashMap<&str, &TypeDescriptor>) -> TypeDescriptor {
    if !ty.is_generic() {
        if let Some(bound) = bindings.get(ty.qualified_name()) {
            return (*bound).clone();
        }
        return ty.clone();
    }
    TypeDescriptor::generic(
        ty.qualified_name(),
        ty.args().iter().map(|a| substitute(a, bindings)).collect(),
    )
}

fn invalid(name: &str, reason: &str) -> CatalogError {
    CatalogError::Invalid {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

impl TypeProvider for TypeCatalog {
    fn describe(&self, ty: &TypeDescriptor) -> Option<TypeShape> {
        let def = self.definitions.get(ty.qualified_name())?;
        let bindings = Self::bind(def, ty)?;

        let shape = match &def.kind {
            DefinitionKind::Struct { members } => TypeShape::Struct {
                members: members
                    .iter()
                    .map(|m| MemberShape {
                        name: m.name.clone(),
                        ty: substitute(&m.ty, &bindings),
                        metadata: m.metadata.clone(),
                    })
                    .collect(),
                metadata: def.metadata.clone(),
            },
            DefinitionKind::Enum { values } => TypeShape::Enum {
                values: values.clone(),
                metadata: def.metadata.clone(),
            },
            DefinitionKind::Scalar { scalar, .. } => TypeShape::Scalar(*scalar),
            DefinitionKind::Sequence { element, unique } => TypeShape::Sequence {
                element: substitute(element, &bindings),
                unique: *unique,
            },
            DefinitionKind::Map { key, value } => TypeShape::Map {
                key: substitute(key, &bindings),
                value: substitute(value, &bindings),
            },
            DefinitionKind::Optional { inner } => TypeShape::Optional {
                inner: substitute(inner, &bindings),
            },
        };
        Some(shape)
    }

    fn is_primitive(&self, ty: &TypeDescriptor) -> bool {
        matches!(
            self.definitions.get(ty.qualified_name()).map(|d| &d.kind),
            Some(DefinitionKind::Scalar {
                primitive: true,
                ..
            })
        )
    }
}

fn builtin_definitions() -> Vec<TypeDefinition> {
    const PRIMITIVES: &[(&str, ScalarKind)] = &[
        ("bool", ScalarKind::Bool),
        ("i8", ScalarKind::Int8),
        ("i16", ScalarKind::Int16),
        ("i32", ScalarKind::Int32),
        ("i64", ScalarKind::Int64),
        ("u8", ScalarKind::UInt8),
        ("u16", ScalarKind::UInt16),
        ("u32", ScalarKind::UInt32),
        ("u64", ScalarKind::UInt64),
        ("f32", ScalarKind::Float32),
        ("f64", ScalarKind::Float64),
        ("char", ScalarKind::Char),
    ];
    const CORE: &[(&str, ScalarKind)] = &[
        ("String", ScalarKind::String),
        ("Bytes", ScalarKind::Bytes),
        ("Date", ScalarKind::Date),
        ("DateTime", ScalarKind::DateTime),
        ("Uuid", ScalarKind::Uuid),
        ("Decimal", ScalarKind::Decimal),
    ];

    let param = || TypeDescriptor::new("T");
    let mut defs = Vec::with_capacity(PRIMITIVES.len() + CORE.len() + 4);

    for (name, scalar) in PRIMITIVES {
        defs.push(TypeDefinition::new(
            *name,
            DefinitionKind::Scalar {
                scalar: *scalar,
                primitive: true,
            },
        ));
    }
    for (name, scalar) in CORE {
        defs.push(TypeDefinition::new(
            format!("{CORE_NAMESPACE}.{name}"),
            DefinitionKind::Scalar {
                scalar: *scalar,
                primitive: false,
            },
        ));
    }

    defs.push(
        TypeDefinition::new(
            format!("{COLLECTIONS_NAMESPACE}.List"),
            DefinitionKind::Sequence {
                element: param(),
                unique: false,
            },
        )
        .with_params(["T"]),
    );
    defs.push(
        TypeDefinition::new(
            format!("{COLLECTIONS_NAMESPACE}.Set"),
            DefinitionKind::Sequence {
                element: param(),
                unique: true,
            },
        )
        .with_params(["T"]),
    );
    defs.push(
        TypeDefinition::new(
            format!("{COLLECTIONS_NAMESPACE}.Map"),
            DefinitionKind::Map {
                key: TypeDescriptor::new("K"),
                value: TypeDescriptor::new("V"),
            },
        )
        .with_params(["K", "V"]),
    );
    defs.push(
        TypeDefinition::new(
            format!("{COLLECTIONS_NAMESPACE}.Optional"),
            DefinitionKind::Optional { inner: param() },
        )
        .with_params(["T"]),
    );
    defs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn d(s: &str) -> TypeDescriptor {
        s.parse().expect("descriptor")
    }

    const SHOP: &str = r#"
[[types]]
name = "acme.Page"
params = ["T"]
kind = "struct"
metadata = [{ key = "description", value = "One page" }]

[[types.members]]
name = "items"
type = "collections.List<T>"

[[types.members]]
name = "total"
type = "i64"

[[types]]
name = "acme.Order"
kind = "struct"

[[types.members]]
name = "id"
type = "i64"
metadata = [{ key = "read_only" }]

[[types]]
name = "acme.Status"
kind = "enum"
values = ["PENDING", "SHIPPED"]
"#;

    #[test]
    fn test_builtins_classification() {
        let catalog = TypeCatalog::with_builtins();
        assert!(catalog.is_primitive(&d("i32")));
        assert!(!catalog.is_primitive(&d("core.String")));
        assert_eq!(
            catalog.describe(&d("core.DateTime")),
            Some(TypeShape::Scalar(ScalarKind::DateTime))
        );
        assert_eq!(
            catalog.describe(&d("collections.Set<acme.Order>")),
            Some(TypeShape::Sequence {
                element: d("acme.Order"),
                unique: true
            })
        );
    }

    #[test]
    fn test_toml_document_with_generic_substitution() {
        let catalog = TypeCatalog::from_toml_str(SHOP).expect("catalog");
        let shape = catalog.describe(&d("acme.Page<acme.Order>")).expect("shape");
        let TypeShape::Struct { members, metadata } = shape else {
            panic!("expected struct shape");
        };
        assert_eq!(members[0].ty, d("collections.List<acme.Order>"));
        assert_eq!(members[1].ty, d("i64"));
        assert_eq!(metadata.get("description"), Some("One page"));
    }

    #[test]
    fn test_arity_mismatch_is_unknown() {
        let catalog = TypeCatalog::from_toml_str(SHOP).expect("catalog");
        assert!(catalog.describe(&d("acme.Page")).is_none());
        assert!(catalog.describe(&d("acme.Order<i32>")).is_none());
        assert!(catalog.describe(&d("acme.Missing")).is_none());
    }

    #[test]
    fn test_json_document() {
        let json = r#"{"types": [
            {"name": "acme.Tag", "kind": "struct",
             "members": [{"name": "label", "type": "core.String"}]},
            {"name": "acme.Labels", "kind": "map", "key": "core.String", "value": "acme.Tag"}
        ]}"#;
        let catalog = TypeCatalog::from_json_str(json).expect("catalog");
        assert!(catalog.contains("acme.Tag"));
        assert_eq!(
            catalog.describe(&d("acme.Labels")),
            Some(TypeShape::Map {
                key: d("core.String"),
                value: d("acme.Tag")
            })
        );
    }

    #[test]
    fn test_from_path_picks_format_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        file.write_all(SHOP.as_bytes()).expect("write");
        let catalog = TypeCatalog::from_path(file.path()).expect("catalog");
        assert!(catalog.contains("acme.Status"));
    }

    #[test]
    fn test_define_rejects_invalid_definitions() {
        let mut catalog = TypeCatalog::with_builtins();
        assert!(matches!(
            catalog.define(TypeDefinition::enumeration("acme.Empty", Vec::<String>::new())),
            Err(CatalogError::Invalid { .. })
        ));
        assert!(matches!(
            catalog.define(TypeDefinition::structure("acme.Page<T>", vec![])),
            Err(CatalogError::Invalid { .. })
        ));
        assert!(matches!(
            catalog.define(TypeDefinition::structure("acme..Bad", vec![])),
            Err(CatalogError::Descriptor { .. })
        ));
        assert!(matches!(
            catalog.define(TypeDefinition::structure("core.String", vec![])),
            Err(CatalogError::Duplicate(_))
        ));
        let dup_members = TypeDefinition::structure(
            "acme.Dup",
            vec![
                MemberDefinition::new("a", d("i32")),
                MemberDefinition::new("a", d("i64")),
            ],
        );
        assert!(matches!(
            catalog.define(dup_members),
            Err(CatalogError::Invalid { .. })
        ));
    }

    #[test]
    fn test_unresolved_references() {
        let mut catalog = TypeCatalog::with_builtins();
        catalog
            .define(
                TypeDefinition::structure(
                    "acme.Box",
                    vec![
                        MemberDefinition::new("value", d("T")),
                        MemberDefinition::new("others", d("collections.List<acme.Ghost>")),
                    ],
                )
                .with_params(["T"]),
            )
            .expect("define");
        let missing = catalog.unresolved_references();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing["acme.Box"], vec!["acme.Ghost".to_string()]);
    }
}
