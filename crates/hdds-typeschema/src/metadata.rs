// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque metadata tags attached to types and members.
//!
//! The resolution context never looks inside metadata. Converters query it by
//! key; the baseline converter understands the keys listed in [`keys`].

use serde::{Deserialize, Serialize};

use crate::schema::SchemaNode;

/// Well-known metadata keys interpreted by the baseline converter.
pub mod keys {
    pub const DESCRIPTION: &str = "description";
    pub const FORMAT: &str = "format";
    pub const TITLE: &str = "title";
    /// Property name override for a struct member.
    pub const RENAME: &str = "rename";
    /// Member is omitted from the object schema.
    pub const HIDDEN: &str = "hidden";
    /// Overrides the default required-ness of a member.
    pub const REQUIRED: &str = "required";
    pub const NULLABLE: &str = "nullable";
    pub const READ_ONLY: &str = "read_only";
    pub const DEPRECATED: &str = "deprecated";
    /// JSON literal; stored as a string if it does not parse.
    pub const EXAMPLE: &str = "example";
}

/// A single `key` or `key = value` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataTag {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl MetadataTag {
    /// Bare flag tag (`hidden`).
    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Key/value tag (`description = "..."`).
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

/// Ordered tag sequence with typed lookups. Later tags win over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    tags: Vec<MetadataTag>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: MetadataTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn push(&mut self, tag: MetadataTag) {
        self.tags.push(tag);
    }

    pub fn tags(&self) -> &[MetadataTag] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tags.iter().any(|t| t.key == key)
    }

    /// Value of the last tag named `key`. A bare flag yields `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|t| t.key == key)
            .map(|t| t.value.as_deref().unwrap_or(""))
    }

    /// Boolean view of `key`: a bare flag or `true`/`yes`/`1` is true,
    /// `false`/`no`/`0` is false, anything else (or absence) is `None`.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim().to_ascii_lowercase().as_str() {
            "" | "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }

    /// Overlay the presentation keys onto `node`.
    ///
    /// Reference nodes carry only a name and are left untouched.
    pub fn apply_to(&self, node: &mut SchemaNode) {
        let Some(meta) = node.meta_mut() else {
            return;
        };
        if let Some(description) = self.get(keys::DESCRIPTION) {
            meta.description = Some(description.to_string());
        }
        if let Some(title) = self.get(keys::TITLE) {
            meta.title = Some(title.to_string());
        }
        if let Some(format) = self.get(keys::FORMAT) {
            meta.format = Some(format.to_string());
        }
        if let Some(nullable) = self.flag(keys::NULLABLE) {
            meta.nullable = nullable;
        }
        if let Some(read_only) = self.flag(keys::READ_ONLY) {
            meta.read_only = read_only;
        }
        if let Some(deprecated) = self.flag(keys::DEPRECATED) {
            meta.deprecated = deprecated;
        }
        if let Some(example) = self.get(keys::EXAMPLE) {
            meta.example = Some(
                serde_json::from_str(example)
                    .unwrap_or_else(|_| serde_json::Value::String(example.to_string())),
            );
        }
    }
}

impl FromIterator<MetadataTag> for Metadata {
    fn from_iter<I: IntoIterator<Item = MetadataTag>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<MetadataTag>> for Metadata {
    fn from(tags: Vec<MetadataTag>) -> Self {
        Self { tags }
    }
}
