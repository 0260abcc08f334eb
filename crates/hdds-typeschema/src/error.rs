// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolution failures.
//!
//! Exclusion is not an error: excluded and primitive descriptors yield an empty
//! result. Every variant below aborts the whole top-level resolution; nothing
//! is retried.

use thiserror::Error;

/// Boxed error raised by a converter implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by a resolution session.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No converter in the chain accepted the descriptor.
    #[error("no converter can resolve type '{type_name}'")]
    UnresolvableType { type_name: String },

    /// A converter failed while resolving.
    #[error("converter '{converter}' failed on type '{type_name}': {source}")]
    ConverterFault {
        converter: String,
        type_name: String,
        #[source]
        source: BoxError,
    },

    /// The chain of nested distinct descriptors exceeded the configured limit.
    #[error("resolution of '{type_name}' exceeded the maximum depth of {limit}")]
    DepthExceeded { type_name: String, limit: usize },

    /// The output references a name with no entry in the registry.
    #[error("schema for '{type_name}' references unregistered name '{name}'")]
    DanglingReference { type_name: String, name: String },
}

impl ResolveError {
    /// Wrap an arbitrary error raised by `converter` while handling `type_name`.
    pub fn fault(
        converter: impl Into<String>,
        type_name: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::ConverterFault {
            converter: converter.into(),
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// Type the failure was reported for.
    pub fn type_name(&self) -> &str {
        match self {
            Self::UnresolvableType { type_name }
            | Self::ConverterFault { type_name, .. }
            | Self::DepthExceeded { type_name, .. }
            | Self::DanglingReference { type_name, .. } => type_name,
        }
    }
}

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
