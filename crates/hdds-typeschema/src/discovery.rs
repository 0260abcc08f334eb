// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Link-time discovery of extension converters.
//!
//! Crates that ship a converter register a factory with
//! [`register_converter!`](crate::register_converter); the global registry
//! instantiates every registration once, on first use.
//!
//! ```ignore
//! use std::sync::Arc;
//! use hdds_typeschema::{register_converter, ModelConverter};
//!
//! fn money() -> Arc<dyn ModelConverter> {
//!     Arc::new(MoneyConverter::default())
//! }
//!
//! register_converter!("money", money);
//! ```

use std::sync::Arc;

use crate::converter::ModelConverter;

/// One extension converter contributed at link time.
pub struct ConverterRegistration {
    pub name: &'static str,
    pub factory: fn() -> Arc<dyn ModelConverter>,
}

impl ConverterRegistration {
    pub const fn new(name: &'static str, factory: fn() -> Arc<dyn ModelConverter>) -> Self {
        Self { name, factory }
    }

    /// Build a fresh converter instance.
    pub fn instantiate(&self) -> Arc<dyn ModelConverter> {
        (self.factory)()
    }
}

impl std::fmt::Debug for ConverterRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

inventory::collect!(ConverterRegistration);

/// Register an extension converter factory.
///
/// `$factory` is any `fn() -> Arc<dyn ModelConverter>`.
#[macro_export]
macro_rules! register_converter {
    ($name:expr, $factory:expr) => {
        $crate::inventory::submit! {
            $crate::discovery::ConverterRegistration::new($name, $factory)
        }
    };
}

/// All linked registrations, ordered by name.
pub fn discovered_converters() -> Vec<&'static ConverterRegistration> {
    let mut found: Vec<&'static ConverterRegistration> =
        inventory::iter::<ConverterRegistration>.into_iter().collect();
    found.sort_by(|a, b| a.name.cmp(b.name));
    log::debug!("[typeschema] discovered {} extension converters", found.len());
    found
}
