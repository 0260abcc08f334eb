// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry name assignment.
//!
//! Names are a function of the *set* of registered descriptors, never of the
//! order in which they were resolved:
//!
//! 1. short name (`acme.Page<acme.Order>` -> `PageOrder`) when no other
//!    registered descriptor shares it;
//! 2. otherwise the namespace-qualified short name (`billing.Order`) when
//!    unique within the colliding group;
//! 3. otherwise the canonical signature, which is unique by construction.
//!
//! Short names never contain a `.`, so the three tiers cannot collide with
//! each other.

use std::collections::HashMap;

use crate::descriptor::TypeDescriptor;

/// Session-internal registry key: the canonical signature.
pub fn provisional_key(ty: &TypeDescriptor) -> String {
    ty.signature()
}

/// Final registry names for a set of distinct descriptors.
pub fn assign_names<'a, I>(descriptors: I) -> HashMap<TypeDescriptor, String>
where
    I: IntoIterator<Item = &'a TypeDescriptor>,
{
    let mut by_short: HashMap<String, Vec<&TypeDescriptor>> = HashMap::new();
    for ty in descriptors {
        let group = by_short.entry(ty.short_name()).or_default();
        if !group.contains(&ty) {
            group.push(ty);
        }
    }

    let mut names = HashMap::with_capacity(by_short.len());
    for (short, group) in by_short {
        if let [single] = group.as_slice() {
            names.insert((*single).clone(), short);
            continue;
        }

        let mut qualified_counts: HashMap<String, usize> = HashMap::new();
        for ty in &group {
            *qualified_counts.entry(ty.namespaced_short_name()).or_default() += 1;
        }
        for ty in group {
            let qualified = ty.namespaced_short_name();
            let name = if qualified_counts.get(&qualified) == Some(&1) {
                qualified
            } else {
                ty.signature()
            };
            log::trace!("[typeschema] name collision on '{}': {} -> {}", short, ty, name);
            names.insert(ty.clone(), name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> TypeDescriptor {
        s.parse().expect("descriptor")
    }

    #[test]
    fn test_unique_short_names() {
        let types = [d("acme.Order"), d("acme.Page<acme.Order>")];
        let names = assign_names(&types);
        assert_eq!(names[&types[0]], "Order");
        assert_eq!(names[&types[1]], "PageOrder");
    }

    #[test]
    fn test_namespace_disambiguation() {
        let types = [d("billing.Order"), d("shipping.Order"), d("acme.Customer")];
        let names = assign_names(&types);
        assert_eq!(names[&types[0]], "billing.Order");
        assert_eq!(names[&types[1]], "shipping.Order");
        assert_eq!(names[&types[2]], "Customer");
    }

    #[test]
    fn test_signature_fallback_for_generic_collisions() {
        let types = [d("acme.Page<a.Item>"), d("acme.Page<b.Item>")];
        let names = assign_names(&types);
        assert_eq!(names[&types[0]], "acme.Page<a.Item>");
        assert_eq!(names[&types[1]], "acme.Page<b.Item>");
    }

    #[test]
    fn test_order_independent() {
        let forward = [d("billing.Order"), d("shipping.Order"), d("Order")];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(assign_names(&forward), assign_names(&backward));
        assert_eq!(assign_names(&forward)[&d("Order")], "Order");
    }
}
