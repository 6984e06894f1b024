// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Namespace objects: the mutable `exports` of a module.
//!
//! A [`Namespace`] is a handle. Cloning it yields another reference to the
//! same underlying mapping, so an assignment made through one holder is
//! observed by every other holder. Property writes never fail.

use crate::value::Value;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Shared, mutable, insertion-ordered mapping of export name to value
#[derive(Clone, Default)]
pub struct Namespace {
    inner: Arc<RwLock<IndexMap<String, Value>>>,
}

impl Namespace {
    /// Create a new empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a namespace from `(name, value)` pairs, in order
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Read a property
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.read().get(name).cloned()
    }

    /// Assign a property, returning the previous value.
    ///
    /// Reassigning an existing key keeps its position.
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.inner.write().insert(name.into(), value)
    }

    /// Check if a property exists
    pub fn has(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// Delete a property
    pub fn delete(&self, name: &str) -> Option<Value> {
        self.inner.write().shift_remove(name)
    }

    /// Property names in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    /// Snapshot of all properties in insertion order
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if there are no properties
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Reference identity
    pub fn ptr_eq(a: &Namespace, b: &Namespace) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Stable address of the underlying object, for diagnostics
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only; nested objects may be cyclic.
        f.debug_struct("Namespace")
            .field("id", &format_args!("{:#x}", self.id()))
            .field("keys", &self.keys())
            .finish()
    }
}
