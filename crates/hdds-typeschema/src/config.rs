// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolver configuration.
//!
//! Supports both programmatic and file-based configuration. A TOML file may
//! hold the resolver settings at the top level or under a `[resolver]` table
//! (the layout used by `hdds-schemagen`).
//!
//! ```toml
//! [resolver]
//! max_depth = 32
//! reference_prefix = "#/definitions/"
//! default_excluded_packages = ["core", "internal"]
//! default_excluded_types = ["acme.Secret"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::provider::CORE_NAMESPACE;
use crate::schema::DEFAULT_REFERENCE_PREFIX;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings shared by every resolution session of a converter registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum number of nested, distinct descriptors on the resolution stack.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Prefix used when rendering `$ref` values.
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,

    /// Package prefixes excluded from root resolution.
    #[serde(default = "default_excluded_packages")]
    pub default_excluded_packages: Vec<String>,

    /// Exact qualified names excluded from root resolution.
    #[serde(default)]
    pub default_excluded_types: Vec<String>,
}

fn default_max_depth() -> usize {
    64
}

fn default_reference_prefix() -> String {
    DEFAULT_REFERENCE_PREFIX.to_string()
}

fn default_excluded_packages() -> Vec<String> {
    vec![CORE_NAMESPACE.to_string()]
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            reference_prefix: default_reference_prefix(),
            default_excluded_packages: default_excluded_packages(),
            default_excluded_types: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Configuration with no default exclusions (used for independent registries).
    pub fn unrestricted() -> Self {
        Self {
            default_excluded_packages: Vec::new(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML. A `resolver` key selects the wrapped layout; its table
    /// must then deserialize on its own.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(content)?;
        let config: Self = match table.remove("resolver") {
            Some(section) => section.try_into()?,
            None => toml::Value::Table(table).try_into()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum resolution depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the `$ref` prefix.
    pub fn reference_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reference_prefix = prefix.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        if self.reference_prefix.is_empty() {
            return Err(ConfigError::Invalid("reference_prefix is empty".into()));
        }
        if let Some(pkg) = self
            .default_excluded_packages
            .iter()
            .find(|p| p.trim_end_matches('.').is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "excluded package '{}' is empty",
                pkg
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.reference_prefix, "#/components/schemas/");
        assert_eq!(config.default_excluded_packages, vec!["core".to_string()]);
        assert!(config.validate().is_ok());
        assert!(ResolverConfig::unrestricted()
            .default_excluded_packages
            .is_empty());
    }

    #[test]
    fn test_wrapped_and_flat_layouts() {
        let wrapped = ResolverConfig::from_toml_str(
            "[resolver]\nmax_depth = 8\ndefault_excluded_types = [\"acme.Secret\"]\n",
        )
        .expect("wrapped");
        assert_eq!(wrapped.max_depth, 8);
        assert_eq!(wrapped.default_excluded_types, vec!["acme.Secret".to_string()]);
        assert_eq!(wrapped.default_excluded_packages, vec!["core".to_string()]);

        let flat = ResolverConfig::from_toml_str("reference_prefix = \"#/definitions/\"\n")
            .expect("flat");
        assert_eq!(flat.reference_prefix, "#/definitions/");
        assert_eq!(flat.max_depth, 64);
    }

    #[test]
    fn test_malformed_resolver_table_is_rejected() {
        for content in [
            "[resolver]\nmax_depth = \"eight\"\n",
            "[resolver]\nmax_depth = -1\n",
            "resolver = 3\n",
        ] {
            assert!(
                matches!(
                    ResolverConfig::from_toml_str(content),
                    Err(ConfigError::Toml(_))
                ),
                "accepted {content:?}"
            );
        }
        assert!(matches!(
            ResolverConfig::from_toml_str("[resolver]\nmax_depth = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validation() {
        assert!(ResolverConfig::default().max_depth(0).validate().is_err());
        assert!(ResolverConfig::default()
            .reference_prefix("")
            .validate()
            .is_err());
        let mut config = ResolverConfig::default();
        config.default_excluded_packages.push(".".into());
        assert!(config.validate().is_err());
        assert!(matches!(
            ResolverConfig::from_toml_str("max_depth = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&ResolverConfig::default()).expect("serialize");
        assert!(toml_str.contains("max_depth = 64"));
    }
}
