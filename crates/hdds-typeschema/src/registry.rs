// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converter registry and resolution entry points.
//!
//! [`ModelConverters`] owns the ordered converter chain and the exclusion
//! rules. Every request opens a fresh [`ResolutionContext`] over a snapshot of
//! the chain, so registering or removing converters never disturbs a request
//! already running.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use dashmap::DashSet;

use crate::config::ResolverConfig;
use crate::context::ResolutionContext;
use crate::converter::{ModelConverter, ModelResolver};
use crate::descriptor::TypeDescriptor;
use crate::discovery::discovered_converters;
use crate::error::{ResolveError, Result};
use crate::metadata::Metadata;
use crate::provider::TypeProvider;
use crate::schema::{ResolvedSchema, SchemaNode};

static GLOBAL: OnceLock<Arc<ModelConverters>> = OnceLock::new();

/// Ordered converter chain plus exclusion rules.
pub struct ModelConverters {
    converters: ArcSwap<Vec<Arc<dyn ModelConverter>>>,
    excluded_packages: DashSet<String>,
    excluded_types: DashSet<String>,
    config: ResolverConfig,
}

impl ModelConverters {
    /// Independent registry with the default configuration and the baseline
    /// converter only.
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        let excluded_packages = DashSet::new();
        for package in &config.default_excluded_packages {
            excluded_packages.insert(normalize_package(package));
        }
        let excluded_types = DashSet::new();
        for name in &config.default_excluded_types {
            excluded_types.insert(name.clone());
        }
        let baseline: Arc<dyn ModelConverter> = Arc::new(ModelResolver::new());
        Self {
            converters: ArcSwap::from_pointee(vec![baseline]),
            excluded_packages,
            excluded_types,
            config,
        }
    }

    /// Process-wide registry, created on first use with the default
    /// configuration and every discovered extension converter.
    pub fn global() -> Arc<ModelConverters> {
        GLOBAL
            .get_or_init(|| Arc::new(Self::bootstrap(ResolverConfig::default())))
            .clone()
    }

    /// Seed the process-wide registry with `config`.
    ///
    /// Returns `false` if it was already initialized, in which case `config`
    /// is ignored.
    pub fn init_global(config: ResolverConfig) -> bool {
        let mut created = false;
        GLOBAL.get_or_init(|| {
            created = true;
            Arc::new(Self::bootstrap(config))
        });
        created
    }

    fn bootstrap(config: ResolverConfig) -> Self {
        let registry = Self::with_config(config);
        // Added in reverse so the chain is consulted in name order.
        for registration in discovered_converters().into_iter().rev() {
            registry.add_converter(registration.instantiate());
        }
        registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Put `converter` at the front of the chain.
    pub fn add_converter(&self, converter: Arc<dyn ModelConverter>) {
        log::debug!("[typeschema] converter '{}' registered", converter.name());
        self.converters.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(Arc::clone(&converter));
            next.extend(current.iter().cloned());
            next
        });
    }

    /// Remove `converter` by identity. Returns whether it was present.
    pub fn remove_converter(&self, converter: &Arc<dyn ModelConverter>) -> bool {
        let mut removed = false;
        self.converters.rcu(|current| {
            let next: Vec<Arc<dyn ModelConverter>> = current
                .iter()
                .filter(|c| !same_converter(c, converter))
                .cloned()
                .collect();
            removed = next.len() != current.len();
            next
        });
        if removed {
            log::debug!("[typeschema] converter '{}' removed", converter.name());
        }
        removed
    }

    /// Current chain, front first.
    pub fn converters(&self) -> Vec<Arc<dyn ModelConverter>> {
        self.converters.load().iter().cloned().collect()
    }

    /// Exclude every type under `package` (whole path segments; a trailing
    /// `.` is accepted).
    #[doc(alias = "add_package_to_skip")]
    pub fn exclude_package(&self, package: &str) {
        self.excluded_packages.insert(normalize_package(package));
    }

    /// Exclude one type by qualified name, whatever its type arguments.
    #[doc(alias = "add_class_to_skip")]
    pub fn exclude_type(&self, qualified_name: &str) {
        self.excluded_types.insert(qualified_name.to_string());
    }

    pub fn excluded_packages(&self) -> Vec<String> {
        let mut packages: Vec<String> = self
            .excluded_packages
            .iter()
            .map(|p| p.key().clone())
            .collect();
        packages.sort();
        packages
    }

    pub fn excluded_types(&self) -> Vec<String> {
        let mut types: Vec<String> =
            self.excluded_types.iter().map(|t| t.key().clone()).collect();
        types.sort();
        types
    }

    /// Whether a root resolution of `ty` would run at all.
    pub fn should_process(&self, ty: &TypeDescriptor, provider: &dyn TypeProvider) -> bool {
        if provider.is_primitive(ty) {
            return false;
        }
        if self.excluded_types.contains(ty.qualified_name()) {
            return false;
        }
        !self
            .excluded_packages
            .iter()
            .any(|package| ty.in_package(package.key()))
    }

    /// Root node of `ty` with final registry names, or `None` if `ty` is
    /// excluded or primitive.
    #[doc(alias = "resolve")]
    pub fn resolve_property(
        &self,
        ty: &TypeDescriptor,
        provider: &dyn TypeProvider,
    ) -> Result<Option<SchemaNode>> {
        Ok(self.run(ty, provider)?.map(|resolved| resolved.schema))
    }

    /// Registry entries equal to the root resolution of `ty`.
    pub fn read(
        &self,
        ty: &TypeDescriptor,
        provider: &dyn TypeProvider,
    ) -> Result<BTreeMap<String, SchemaNode>> {
        let Some(resolved) = self.run(ty, provider)? else {
            return Ok(BTreeMap::new());
        };
        let ResolvedSchema {
            schema,
            referenced_schemas,
        } = resolved;
        Ok(referenced_schemas
            .into_iter()
            .filter(|(_, node)| *node == schema)
            .collect())
    }

    /// Every named schema registered while resolving `ty`.
    #[doc(alias = "resolve_all")]
    pub fn read_all(
        &self,
        ty: &TypeDescriptor,
        provider: &dyn TypeProvider,
    ) -> Result<BTreeMap<String, SchemaNode>> {
        Ok(self
            .run(ty, provider)?
            .map(|resolved| resolved.referenced_schemas)
            .unwrap_or_default())
    }

    /// Root node and full registry in one value.
    #[doc(alias = "resolve_all_as_resolved_schema")]
    pub fn read_all_as_resolved_schema(
        &self,
        ty: &TypeDescriptor,
        provider: &dyn TypeProvider,
    ) -> Result<Option<ResolvedSchema>> {
        self.run(ty, provider)
    }

    /// Resolve `ty` as a member annotated with `metadata`.
    ///
    /// Exclusions do not apply: the caller already decided the member exists.
    /// When `ty` is registered (objects, enums) the root is a reference and
    /// `metadata` is not applied; only inline nodes carry element metadata.
    pub fn resolve_annotated_type(
        &self,
        ty: &TypeDescriptor,
        metadata: &Metadata,
        element_name: Option<&str>,
        provider: &dyn TypeProvider,
    ) -> Result<ResolvedSchema> {
        let mut ctx = self.context(provider);
        let root = ctx.resolve_annotated(ty, metadata, element_name)?;
        finish(ty, ctx, root)
    }

    fn context<'a>(&'a self, provider: &'a dyn TypeProvider) -> ResolutionContext<'a> {
        ResolutionContext::new(self.converters.load_full(), provider, &self.config)
    }

    fn run(
        &self,
        ty: &TypeDescriptor,
        provider: &dyn TypeProvider,
    ) -> Result<Option<ResolvedSchema>> {
        if !self.should_process(ty, provider) {
            log::debug!("[typeschema] skipping excluded or primitive type '{}'", ty);
            return Ok(None);
        }
        log::debug!("[typeschema] resolving '{}'", ty);
        let mut ctx = self.context(provider);
        let root = ctx.resolve(ty)?;
        finish(ty, ctx, root).map(Some)
    }
}

impl Default for ModelConverters {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelConverters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .converters
            .load()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        f.debug_struct("ModelConverters")
            .field("converters", &names)
            .field("excluded_packages", &self.excluded_packages())
            .field("excluded_types", &self.excluded_types())
            .field("config", &self.config)
            .finish()
    }
}

/// Close the session; a reference without a registry entry fails the request.
fn finish(
    ty: &TypeDescriptor,
    ctx: ResolutionContext<'_>,
    root: SchemaNode,
) -> Result<ResolvedSchema> {
    let resolved = ctx.into_resolved(root);
    if let Some(name) = resolved.dangling_references().into_iter().next() {
        log::warn!("[typeschema] '{}' resolved with unregistered reference '{}'", ty, name);
        return Err(ResolveError::DanglingReference {
            type_name: ty.signature(),
            name,
        });
    }
    Ok(resolved)
}

fn normalize_package(package: &str) -> String {
    package.trim_end_matches('.').to_string()
}

/// Identity comparison on the data pointer only; vtable pointers of the same
/// type may differ between codegen units.
fn same_converter(a: &Arc<dyn ModelConverter>, b: &Arc<dyn ModelConverter>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::Resolution;
    use crate::provider::{MemberDefinition, TypeCatalog, TypeDefinition};
    use crate::schema::{PrimitiveType, SchemaKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn d(s: &str) -> TypeDescriptor {
        s.parse().expect("descriptor")
    }

    /// Resolves every type to a fixed primitive and counts calls.
    struct Fixed {
        name: &'static str,
        ty: PrimitiveType,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, ty: PrimitiveType) -> Arc<Self> {
            Arc::new(Self {
                name,
                ty,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl ModelConverter for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn resolve(
            &self,
            _ty: &TypeDescriptor,
            _ctx: &mut ResolutionContext<'_>,
        ) -> std::result::Result<Resolution, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Resolution::Resolved(SchemaNode::primitive(self.ty, None)))
        }
    }

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::with_builtins();
        catalog
            .define(TypeDefinition::structure(
                "acme.Order",
                vec![MemberDefinition::new("id", d("i64"))],
            ))
            .expect("define");
        catalog
    }

    #[test]
    fn test_last_registered_is_consulted_first() {
        let registry = ModelConverters::new();
        let catalog = catalog();
        let first = Fixed::new("first", PrimitiveType::Boolean);
        let second = Fixed::new("second", PrimitiveType::Number);
        registry.add_converter(first.clone());
        registry.add_converter(second.clone());

        let names: Vec<String> = registry
            .converters()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, ["second", "first", "model-resolver"]);

        let node = registry
            .resolve_property(&d("acme.Order"), &catalog)
            .expect("resolve")
            .expect("not excluded");
        assert_eq!(node, SchemaNode::primitive(PrimitiveType::Number, None));
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_by_identity() {
        let registry = ModelConverters::new();
        let kept: Arc<dyn ModelConverter> = Fixed::new("twin", PrimitiveType::Boolean);
        let removed: Arc<dyn ModelConverter> = Fixed::new("twin", PrimitiveType::Number);
        registry.add_converter(kept.clone());
        registry.add_converter(removed.clone());

        assert!(registry.remove_converter(&removed));
        assert!(!registry.remove_converter(&removed));
        let chain = registry.converters();
        assert_eq!(chain.len(), 2);
        assert!(same_converter(&chain[0], &kept));
    }

    #[test]
    fn test_exclusions() {
        let registry = ModelConverters::new();
        let catalog = catalog();
        let spy = Fixed::new("spy", PrimitiveType::String);
        registry.add_converter(spy.clone());
        registry.exclude_package("acme.");
        registry.exclude_type("billing.Invoice");

        assert!(registry.resolve_property(&d("acme.Order"), &catalog).expect("ok").is_none());
        assert!(registry.read_all(&d("acme.Order"), &catalog).expect("ok").is_empty());
        assert!(registry.read(&d("core.String"), &catalog).expect("ok").is_empty());
        assert!(registry
            .read_all_as_resolved_schema(&d("billing.Invoice<i32>"), &catalog)
            .expect("ok")
            .is_none());
        assert!(registry.resolve_property(&d("i32"), &catalog).expect("ok").is_none());
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);

        assert!(registry.should_process(&d("acmeish.Order"), &catalog));
        assert_eq!(registry.excluded_packages(), ["acme", "core"]);
        assert_eq!(registry.excluded_types(), ["billing.Invoice"]);
    }

    #[test]
    fn test_read_returns_root_entry_only() {
        let mut catalog = catalog();
        catalog
            .define(TypeDefinition::structure(
                "acme.Cart",
                vec![MemberDefinition::new("order", d("acme.Order"))],
            ))
            .expect("define");
        let registry = ModelConverters::new();

        let root_only = registry.read(&d("acme.Cart"), &catalog).expect("read");
        assert_eq!(root_only.keys().collect::<Vec<_>>(), ["Cart"]);

        let all = registry.read_all(&d("acme.Cart"), &catalog).expect("read_all");
        assert_eq!(all.keys().collect::<Vec<_>>(), ["Cart", "Order"]);
        assert_eq!(all["Cart"].kind(), SchemaKind::Object);
    }

    #[test]
    fn test_annotated_type_ignores_exclusions() {
        let registry = ModelConverters::new();
        let catalog = catalog();
        let metadata = Metadata::new().with(crate::metadata::MetadataTag::flag("read_only"));
        let resolved = registry
            .resolve_annotated_type(&d("core.Uuid"), &metadata, Some("id"), &catalog)
            .expect("resolve");
        let meta = resolved.schema.meta().expect("inline");
        assert!(meta.read_only);
        assert_eq!(meta.title.as_deref(), Some("id"));
        assert!(resolved.referenced_schemas.is_empty());
    }

    #[test]
    fn test_config_exclusions_seed_registry() {
        let mut config = ResolverConfig::unrestricted();
        config.default_excluded_types.push("acme.Order".into());
        let registry = ModelConverters::with_config(config);
        let catalog = catalog();
        assert!(registry.should_process(&d("core.String"), &catalog));
        assert!(!registry.should_process(&d("acme.Order"), &catalog));
    }

    #[test]
    fn test_global_is_shared() {
        let a = ModelConverters::global();
        let b = ModelConverters::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!ModelConverters::init_global(ResolverConfig::default()));
        assert!(a.excluded_packages().contains(&"core".to_string()));
    }
}
