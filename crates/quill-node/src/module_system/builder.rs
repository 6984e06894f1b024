// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Namespace builders and the table of known built-in specifiers

use crate::error::Result;
use crate::module_system::specifier::Specifier;
use crate::modules;
use crate::namespace::Namespace;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Factory producing the initial namespace object for a specifier.
///
/// Builders must return a fresh namespace on every call and must not cache;
/// the registry invokes each builder at most once per successful build.
pub trait NamespaceBuilder: Send + Sync {
    /// Build the namespace for `specifier`
    fn build(&self, specifier: &Specifier) -> Result<Namespace>;
}

impl<F> NamespaceBuilder for F
where
    F: Fn(&Specifier) -> Result<Namespace> + Send + Sync,
{
    fn build(&self, specifier: &Specifier) -> Result<Namespace> {
        self(specifier)
    }
}

/// Enumerable table of specifier to builder
#[derive(Clone, Default)]
pub struct BuilderTable {
    builders: BTreeMap<Specifier, Arc<dyn NamespaceBuilder>>,
}

impl BuilderTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every built-in module this runtime ships
    pub fn node_builtins() -> Self {
        let mut table = Self::new();

        table.register("node:buffer", native(modules::buffer::create_module));
        table.register("node:path", native(modules::path::create_module));
        table.register("node:timers", native(modules::timers::create_module));
        table.register(
            "node:timers/promises",
            native(modules::timers_promises::create_module),
        );
        table.register("node:util", native(modules::util::create_module));

        table
    }

    /// Register (or replace) the builder for `specifier`
    pub fn register<B>(&mut self, specifier: impl Into<Specifier>, builder: B) -> &mut Self
    where
        B: NamespaceBuilder + 'static,
    {
        self.builders.insert(specifier.into(), Arc::new(builder));
        self
    }

    /// Remove the builder for `specifier`
    pub fn remove(&mut self, specifier: &str) -> bool {
        self.builders.remove(specifier).is_some()
    }

    /// Look up the builder for `specifier`
    pub fn get(&self, specifier: &Specifier) -> Option<Arc<dyn NamespaceBuilder>> {
        self.builders.get(specifier).cloned()
    }

    /// Check if `specifier` has a builder
    pub fn contains(&self, specifier: &str) -> bool {
        self.builders.contains_key(specifier)
    }

    /// All known specifiers, sorted
    pub fn specifiers(&self) -> Vec<Specifier> {
        self.builders.keys().cloned().collect()
    }

    /// Number of builders
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

/// Adapt an infallible `create_module` function into a builder
fn native(create: fn() -> Namespace) -> impl NamespaceBuilder {
    move |_: &Specifier| -> Result<Namespace> { Ok(create()) }
}

impl fmt::Debug for BuilderTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.builders.keys()).finish()
    }
}
