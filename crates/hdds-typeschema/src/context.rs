// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-session resolution state.
//!
//! One [`ResolutionContext`] exists per top-level request. It owns:
//!
//! - the in-flight set: descriptors currently on the resolution stack. Meeting
//!   one of them again yields a reference node instead of recursing, so cyclic
//!   type graphs terminate;
//! - the completed map: every descriptor resolved in this session, so no
//!   converter runs twice for the same descriptor;
//! - a snapshot of the converter chain taken when the session opened.
//!
//! During the session, registered nodes and references are keyed by the
//! canonical signature. Final registry names are assigned by
//! [`naming::assign_names`] when the registry is read out.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::converter::{ModelConverter, Resolution};
use crate::descriptor::TypeDescriptor;
use crate::error::ResolveError;
use crate::metadata::Metadata;
use crate::naming;
use crate::provider::TypeProvider;
use crate::schema::{ResolvedSchema, SchemaNode};

/// Snapshot of the converter chain used by a session.
pub type ConverterChain = Arc<Vec<Arc<dyn ModelConverter>>>;

/// Session counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Descriptors that went through the converter chain.
    pub chain_runs: u64,
    /// Individual converter invocations (declines included).
    pub converter_calls: u64,
    /// Lookups answered from the completed map.
    pub cache_hits: u64,
    /// Reference nodes emitted to break a cycle.
    pub cycle_references: u64,
    /// Deepest resolution stack observed.
    pub max_depth_reached: usize,
}

/// State of one resolution session.
pub struct ResolutionContext<'a> {
    converters: ConverterChain,
    provider: &'a dyn TypeProvider,
    config: &'a ResolverConfig,
    in_flight: HashSet<TypeDescriptor>,
    stack: Vec<TypeDescriptor>,
    completed: HashMap<TypeDescriptor, SchemaNode>,
    registered: BTreeSet<TypeDescriptor>,
    cyclic: HashSet<TypeDescriptor>,
    /// Cyclic descriptors whose node is itself a reference, keyed by
    /// provisional key, pointing at the reference target.
    aliases: HashMap<String, String>,
    stats: ResolutionStats,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        converters: ConverterChain,
        provider: &'a dyn TypeProvider,
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            converters,
            provider,
            config,
            in_flight: HashSet::new(),
            stack: Vec::new(),
            completed: HashMap::new(),
            registered: BTreeSet::new(),
            cyclic: HashSet::new(),
            aliases: HashMap::new(),
            stats: ResolutionStats::default(),
        }
    }

    /// Type information for converters.
    pub fn provider(&self) -> &'a dyn TypeProvider {
        self.provider
    }

    pub fn config(&self) -> &'a ResolverConfig {
        self.config
    }

    pub fn stats(&self) -> ResolutionStats {
        self.stats
    }

    /// Number of descriptors currently being resolved.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_in_flight(&self, ty: &TypeDescriptor) -> bool {
        self.in_flight.contains(ty)
    }

    pub fn is_resolved(&self, ty: &TypeDescriptor) -> bool {
        self.completed.contains_key(ty)
    }

    /// Resolve `ty` to its full node.
    ///
    /// - in flight: a reference to `ty` (cycle break);
    /// - already resolved: the cached node;
    /// - otherwise: the first non-declining converter's result. Objects, enums
    ///   and anything referenced while in flight are registered, except a cyclic
    ///   descriptor that resolved to a reference: its cycle references are
    ///   redirected to that reference's target.
    pub fn resolve(&mut self, ty: &TypeDescriptor) -> Result<SchemaNode, ResolveError> {
        if self.in_flight.contains(ty) {
            self.stats.cycle_references += 1;
            self.cyclic.insert(ty.clone());
            log::trace!("[typeschema] cycle on '{}', emitting reference", ty);
            return Ok(SchemaNode::reference(naming::provisional_key(ty)));
        }

        if let Some(node) = self.completed.get(ty) {
            self.stats.cache_hits += 1;
            return Ok(node.clone());
        }

        if self.stack.len() >= self.config.max_depth {
            return Err(ResolveError::DepthExceeded {
                type_name: ty.signature(),
                limit: self.config.max_depth,
            });
        }

        self.in_flight.insert(ty.clone());
        self.stack.push(ty.clone());
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(self.stack.len());

        let outcome = self.run_chain(ty);

        self.stack.pop();
        self.in_flight.remove(ty);
        let mut node = outcome?;

        if self.cyclic.contains(ty) {
            if let Some(target) = node.reference_name() {
                log::trace!("[typeschema] '{}' aliased to '{}'", ty, target);
                self.aliases.insert(naming::provisional_key(ty), target.to_string());
                self.completed.insert(ty.clone(), node.clone());
                return Ok(node);
            }
        }

        if node.is_registrable() || self.cyclic.contains(ty) {
            if let Some(meta) = node.meta_mut() {
                meta.name = Some(naming::provisional_key(ty));
            }
            self.registered.insert(ty.clone());
        }
        self.completed.insert(ty.clone(), node.clone());
        Ok(node)
    }

    /// Resolve `ty` in the form a parent embeds it: a reference if the type is
    /// registered, the inline node otherwise.
    pub fn resolve_property(&mut self, ty: &TypeDescriptor) -> Result<SchemaNode, ResolveError> {
        let node = self.resolve(ty)?;
        Ok(match node.name() {
            Some(name) => SchemaNode::reference(name),
            None => node,
        })
    }

    /// Property-form resolution with element metadata overlaid.
    ///
    /// The metadata affects only the returned node, never the registered body;
    /// `element_name` becomes the title unless the metadata sets one. A
    /// registered type comes back as a bare reference, which carries no
    /// metadata, so the tags are dropped.
    pub fn resolve_annotated(
        &mut self,
        ty: &TypeDescriptor,
        metadata: &Metadata,
        element_name: Option<&str>,
    ) -> Result<SchemaNode, ResolveError> {
        let mut node = self.resolve_property(ty)?;
        if node.is_reference() && !metadata.is_empty() {
            log::trace!(
                "[typeschema] '{}' is a reference, {} metadata tags dropped",
                ty,
                metadata.tags().len()
            );
        }
        if let (Some(element), Some(meta)) = (element_name, node.meta_mut()) {
            meta.title = Some(element.to_string());
        }
        metadata.apply_to(&mut node);
        Ok(node)
    }

    fn run_chain(&mut self, ty: &TypeDescriptor) -> Result<SchemaNode, ResolveError> {
        self.stats.chain_runs += 1;
        let converters = Arc::clone(&self.converters);
        for converter in converters.iter() {
            self.stats.converter_calls += 1;
            match converter.resolve(ty, self)? {
                Resolution::Resolved(node) => {
                    log::trace!(
                        "[typeschema] '{}' resolved by '{}' as {:?}",
                        ty,
                        converter.name(),
                        node.kind()
                    );
                    return Ok(node);
                }
                Resolution::Declined => {}
            }
        }
        log::warn!("[typeschema] no converter accepted '{}'", ty);
        Err(ResolveError::UnresolvableType {
            type_name: ty.signature(),
        })
    }

    fn final_names(&self) -> HashMap<String, String> {
        let mut names: HashMap<String, String> = naming::assign_names(&self.registered)
            .into_iter()
            .map(|(ty, name)| (naming::provisional_key(&ty), name))
            .collect();
        for (alias, target) in &self.aliases {
            let mut target = target;
            // Alias chains are bounded by the number of aliases.
            for _ in 0..self.aliases.len() {
                match self.aliases.get(target) {
                    Some(next) => target = next,
                    None => break,
                }
            }
            let resolved = names.get(target).cloned().unwrap_or_else(|| target.clone());
            names.insert(alias.clone(), resolved);
        }
        names
    }

    fn registry_with(&self, names: &HashMap<String, String>) -> BTreeMap<String, SchemaNode> {
        let mut models = BTreeMap::new();
        for ty in &self.registered {
            let Some(node) = self.completed.get(ty) else {
                continue;
            };
            let mut node = node.clone();
            node.rename_references(names);
            let key = names
                .get(&naming::provisional_key(ty))
                .cloned()
                .unwrap_or_else(|| ty.signature());
            models.insert(key, node);
        }
        models
    }

    /// Registry accumulated so far, under final names.
    ///
    /// Snapshot semantics: taken mid-session it does not include types still in
    /// flight, and later registrations may change names through collisions.
    #[doc(alias = "get_defined_models")]
    pub fn defined_models(&self) -> BTreeMap<String, SchemaNode> {
        self.registry_with(&self.final_names())
    }

    /// Close the session: rename `root` and the registry to their final names.
    pub fn into_resolved(self, mut root: SchemaNode) -> ResolvedSchema {
        let names = self.final_names();
        root.rename_references(&names);
        let referenced = self.registry_with(&names);
        log::debug!(
            "[typeschema] session closed: {} named schemas, {} chain runs, {} cache hits",
            referenced.len(),
            self.stats.chain_runs,
            self.stats.cache_hits
        );
        ResolvedSchema::new(root, referenced)
    }
}
