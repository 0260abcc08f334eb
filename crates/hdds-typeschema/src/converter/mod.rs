// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converter capability.
//!
//! A converter is one strategy for turning a descriptor into a schema node.
//! The resolution context consults converters in order and stops at the first
//! one that returns [`Resolution::Resolved`]. Converters hold no per-session
//! state: anything they learn about nested types goes back through
//! [`ResolutionContext::resolve`](crate::ResolutionContext::resolve) so that
//! memoization and cycle breaking stay in one place.

mod model_resolver;

pub use model_resolver::ModelResolver;

use crate::context::ResolutionContext;
use crate::descriptor::TypeDescriptor;
use crate::error::ResolveError;
use crate::schema::SchemaNode;

/// Outcome of a single converter invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(SchemaNode),
    /// Let the next converter in the chain try.
    Declined,
}

impl Resolution {
    pub fn into_node(self) -> Option<SchemaNode> {
        match self {
            Self::Resolved(node) => Some(node),
            Self::Declined => None,
        }
    }
}

impl From<Option<SchemaNode>> for Resolution {
    fn from(value: Option<SchemaNode>) -> Self {
        value.map_or(Self::Declined, Self::Resolved)
    }
}

/// Pluggable resolution strategy.
///
/// Implementations must tolerate being called any number of times for the same
/// descriptor across sessions.
pub trait ModelConverter: Send + Sync {
    /// Identifier used in logs and fault reports.
    fn name(&self) -> &str;

    /// Resolve `ty`, or decline.
    ///
    /// Nested types should be resolved through `ctx`; errors returned from
    /// `ctx` must be propagated unchanged.
    fn resolve(
        &self,
        ty: &TypeDescriptor,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Resolution, ResolveError>;
}
