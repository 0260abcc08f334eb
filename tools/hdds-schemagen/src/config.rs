// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CLI configuration file (`schemagen.toml`).
//!
//! ```toml
//! [resolver]
//! max_depth = 64
//! default_excluded_packages = ["core"]
//!
//! [output]
//! pretty = true
//! mode = "document"
//! ```

use hdds_typeschema::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Resolver(#[from] hdds_typeschema::ConfigError),
}

/// What `resolve` prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Root schema only.
    Root,
    /// Named schemas only.
    All,
    /// Root schema plus `components.schemas`.
    #[default]
    Document,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,

    #[serde(default)]
    pub mode: OutputMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.resolver.validate()?;
        Ok(config)
    }

    /// Configuration written by `gen-config`.
    pub fn example() -> Self {
        Self {
            resolver: ResolverConfig {
                default_excluded_types: vec!["acme.internal.AuditTrail".into()],
                ..ResolverConfig::default()
            },
            output: OutputConfig {
                pretty: true,
                mode: OutputMode::Document,
            },
        }
    }
}
