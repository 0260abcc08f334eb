// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hdds-typeschema - Type-to-schema resolution
//!
//! Turns type descriptors (`acme.Page<acme.Order>`) into JSON-Schema style
//! nodes through an ordered chain of pluggable converters. Object and enum
//! schemas are collected into a named registry; nested occurrences become
//! references, which keeps cyclic type graphs finite.
//!
//! ## Quick Start
//!
//! ```rust
//! use hdds_typeschema::{ModelConverters, TypeCatalog};
//!
//! let catalog = TypeCatalog::from_toml_str(r#"
//! [[types]]
//! name = "acme.Order"
//! kind = "struct"
//!
//! [[types.members]]
//! name = "id"
//! type = "i64"
//!
//! [[types.members]]
//! name = "items"
//! type = "collections.List<acme.Order>"
//! "#)?;
//!
//! let registry = ModelConverters::new();
//! let resolved = registry
//!     .read_all_as_resolved_schema(&"acme.Order".parse()?, &catalog)?
//!     .expect("not excluded");
//! assert!(resolved.referenced_schemas.contains_key("Order"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  ModelConverters   exclusion rules | converter chain (copy-on-write) |
//! +---------------------------------------------------------------------+
//! |  ResolutionContext  in-flight set | completed map | naming          |
//! +---------------------------------------------------------------------+
//! |  ModelConverter     ModelResolver (baseline) | extension converters |
//! +---------------------------------------------------------------------+
//! |  TypeProvider       TypeCatalog (TOML / JSON) | custom providers    |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`registry`] - Facade and process-wide registry (start here)
//! - [`context`] - Per-request resolution state
//! - [`converter`] - Converter trait and the baseline converter
//! - [`provider`] - Type information sources
//! - [`schema`] - Schema model and JSON emission

/// Resolver configuration (limits, default exclusions).
pub mod config;
/// Per-request resolution state.
pub mod context;
/// Converter capability and the baseline converter.
pub mod converter;
/// Canonical type identity and descriptor parsing.
pub mod descriptor;
/// Link-time registration of extension converters.
pub mod discovery;
/// Resolution errors.
pub mod error;
/// Opaque key/value annotations on types and members.
pub mod metadata;
/// Registry name assignment.
pub mod naming;
/// Type-description providers.
pub mod provider;
/// Converter registry facade.
pub mod registry;
/// Schema model.
pub mod schema;

pub use config::{ConfigError, ResolverConfig};
pub use context::{ResolutionContext, ResolutionStats};
pub use converter::{ModelConverter, ModelResolver, Resolution};
pub use descriptor::{DescriptorError, TypeDescriptor};
pub use discovery::{discovered_converters, ConverterRegistration};
pub use error::{BoxError, ResolveError, Result};
pub use metadata::{Metadata, MetadataTag};
pub use provider::{
    CatalogError, DefinitionKind, MemberDefinition, MemberShape, ScalarKind, TypeCatalog,
    TypeDefinition, TypeProvider, TypeShape,
};
pub use registry::ModelConverters;
pub use schema::{
    ArraySchema, EnumSchema, ObjectSchema, PrimitiveSchema, PrimitiveType, ResolvedSchema,
    SchemaKind, SchemaMeta, SchemaNode,
};

#[doc(hidden)]
pub use inventory;
