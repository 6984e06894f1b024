// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Built-in module registry
//!
//! Maps a specifier to its singleton namespace object. Each entry moves
//! through `Absent -> Building -> Cached` and never leaves `Cached`: there is
//! no eviction, so a property patched on a namespace stays visible to every
//! later `require()` of the same specifier.
//!
//! Concurrent first-time lookups of one specifier serialize on a
//! per-specifier build lock, so the builder runs once. Lookups of a cached
//! entry only take a shard read lock.
//!
//! A builder that requires a specifier already being built further up its
//! own chain gets `CircularDependency`, whether that chain stays on one
//! thread or crosses threads blocked on each other's build locks.

use crate::config::RuntimeConfig;
use crate::error::{NodeError, Result};
use crate::module_system::builder::BuilderTable;
use crate::module_system::specifier::Specifier;
use crate::namespace::Namespace;
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use tracing::{debug, trace, warn};

/// Lifecycle of a specifier within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Never built, or the last build failed
    Absent,
    /// A builder is running
    Building,
    /// Namespace is cached for the registry's lifetime
    Cached,
}

/// Snapshot of registry counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that had to build
    pub misses: u64,
    /// Successful builder invocations
    pub builds: u64,
    /// Failed builder invocations
    pub build_failures: u64,
    /// Lookups of unknown specifiers
    pub not_found: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    build_failures: AtomicU64,
    not_found: AtomicU64,
}

/// Removes the in-flight record for a specifier when its build ends
struct InFlight<'a> {
    building: &'a DashMap<Specifier, ThreadId>,
    specifier: &'a Specifier,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.building.remove(self.specifier);
    }
}

static GLOBAL: OnceLock<Arc<ModuleRegistry>> = OnceLock::new();

/// Thread-safe registry of built-in namespace objects
pub struct ModuleRegistry {
    /// Known specifiers and their builders
    table: BuilderTable,
    /// Populated namespaces; entries are never removed
    cache: DashMap<Specifier, Namespace>,
    /// Per-specifier critical section for first builds
    build_locks: DashMap<Specifier, Arc<Mutex<()>>>,
    /// Thread running the builder of each in-flight specifier
    building: DashMap<Specifier, ThreadId>,
    /// Threads blocked on another thread's build, and what they wait for
    waiting: DashMap<ThreadId, Specifier>,
    /// Whether `require("timers")` means `require("node:timers")`
    allow_bare_specifiers: bool,
    counters: Counters,
}

impl ModuleRegistry {
    /// Create a registry over `table`
    pub fn new(table: BuilderTable) -> Self {
        Self {
            table,
            cache: DashMap::new(),
            build_locks: DashMap::new(),
            building: DashMap::new(),
            waiting: DashMap::new(),
            allow_bare_specifiers: true,
            counters: Counters::default(),
        }
    }

    /// Registry with the default built-in modules
    pub fn with_node_builtins() -> Self {
        Self::new(BuilderTable::node_builtins())
    }

    /// Registry configured from `config`
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut table = BuilderTable::node_builtins();
        for name in &config.disabled_builtins {
            let qualified = Specifier::new(name).qualified();
            if !table.remove(qualified.as_str()) {
                warn!("Ignoring unknown disabled built-in '{}'", name);
            }
        }

        let mut registry = Self::new(table);
        registry.allow_bare_specifiers = config.allow_bare_specifiers;
        registry
    }

    /// The process-wide registry shared by every `create_require()` front-end
    pub fn global() -> Arc<ModuleRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ModuleRegistry::with_node_builtins())))
    }

    /// Set whether bare built-in names are accepted
    pub fn set_allow_bare_specifiers(&mut self, allow: bool) {
        self.allow_bare_specifiers = allow;
    }

    /// Whether bare built-in names are accepted
    pub fn allow_bare_specifiers(&self) -> bool {
        self.allow_bare_specifiers
    }

    /// Return the namespace for `specifier`, building it on first use.
    ///
    /// Every successful call for the same specifier returns a handle to the
    /// same object. Unknown specifiers and failed builds leave no entry.
    pub fn get_or_create(&self, specifier: &Specifier) -> Result<Namespace> {
        if let Some(namespace) = self.cached(specifier) {
            return Ok(namespace);
        }

        let Some(builder) = self.table.get(specifier) else {
            self.counters.not_found.fetch_add(1, Ordering::Relaxed);
            warn!("Cannot find module '{}'", specifier);
            return Err(NodeError::module_not_found(specifier.as_str()));
        };

        let me = thread::current().id();
        if self.building.get(specifier).is_some_and(|owner| *owner == me) {
            return Err(NodeError::CircularDependency(specifier.to_string()));
        }

        let lock = Arc::clone(&self.build_locks.entry(specifier.clone()).or_default());
        let _guard = match lock.try_lock() {
            Some(guard) => guard,
            None => self.wait_for_build(&lock, specifier, me)?,
        };

        // Another thread may have finished the build while we waited
        if let Some(namespace) = self.cached(specifier) {
            return Ok(namespace);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        self.building.insert(specifier.clone(), me);
        let _in_flight = InFlight {
            building: &self.building,
            specifier,
        };
        let built = builder.build(specifier);

        match built {
            Ok(namespace) => {
                self.cache.insert(specifier.clone(), namespace.clone());
                self.counters.builds.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Built namespace for {} ({} exports, id {:#x})",
                    specifier,
                    namespace.len(),
                    namespace.id()
                );
                Ok(namespace)
            }
            Err(err) => {
                self.counters.build_failures.fetch_add(1, Ordering::Relaxed);
                warn!("Builder for {} failed: {}", specifier, err);
                Err(match err {
                    err @ (NodeError::Builder { .. } | NodeError::CircularDependency(_)) => err,
                    other => NodeError::builder(specifier.as_str(), other.to_string()),
                })
            }
        }
    }

    /// Get a cached namespace without building
    pub fn get(&self, specifier: &Specifier) -> Option<Namespace> {
        self.cache.get(specifier).map(|entry| entry.value().clone())
    }

    /// Current lifecycle state of `specifier`
    pub fn state(&self, specifier: &Specifier) -> ModuleState {
        if self.cache.contains_key(specifier) {
            return ModuleState::Cached;
        }
        let building = self.building.contains_key(specifier);
        // Re-check: the build may have completed between the two reads
        if self.cache.contains_key(specifier) {
            ModuleState::Cached
        } else if building {
            ModuleState::Building
        } else {
            ModuleState::Absent
        }
    }

    /// Check if a builder exists for `specifier`
    pub fn is_known(&self, specifier: &str) -> bool {
        self.table.contains(specifier)
    }

    /// All specifiers this registry can build, sorted
    pub fn known_specifiers(&self) -> Vec<Specifier> {
        self.table.specifiers()
    }

    /// Specifiers whose namespace is cached, sorted
    pub fn cached_specifiers(&self) -> Vec<Specifier> {
        let mut specs: Vec<Specifier> = self.cache.iter().map(|e| e.key().clone()).collect();
        specs.sort();
        specs
    }

    /// Number of cached namespaces
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing has been built yet
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Counter snapshot
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            builds: self.counters.builds.load(Ordering::Relaxed),
            build_failures: self.counters.build_failures.load(Ordering::Relaxed),
            not_found: self.counters.not_found.load(Ordering::Relaxed),
        }
    }

    fn cached(&self, specifier: &Specifier) -> Option<Namespace> {
        let namespace = self.get(specifier)?;
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        trace!("Cache hit for {}", specifier);
        Some(namespace)
    }

    /// Block until the thread building `specifier` finishes, unless that
    /// thread is itself waiting (directly or through others) on a build
    /// owned by `me`.
    fn wait_for_build<'a>(
        &self,
        lock: &'a Mutex<()>,
        specifier: &Specifier,
        me: ThreadId,
    ) -> Result<MutexGuard<'a, ()>> {
        self.waiting.insert(me, specifier.clone());
        let result = if self.closes_cycle(specifier, me) {
            warn!("Circular build across threads at {}", specifier);
            Err(NodeError::CircularDependency(specifier.to_string()))
        } else {
            Ok(lock.lock())
        };
        self.waiting.remove(&me);
        result
    }

    /// Follow the wait-for chain starting at `specifier`'s builder
    fn closes_cycle(&self, specifier: &Specifier, me: ThreadId) -> bool {
        let mut wanted = specifier.clone();
        for _ in 0..=self.waiting.len() {
            let Some(owner) = self.building.get(&wanted).map(|entry| *entry.value()) else {
                return false;
            };
            if owner == me {
                return true;
            }
            let Some(next) = self.waiting.get(&owner).map(|entry| entry.value().clone()) else {
                return false;
            };
            wanted = next;
        }
        false
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::with_node_builtins()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("known", &self.table)
            .field("cached", &self.cached_specifiers())
            .field("allow_bare_specifiers", &self.allow_bare_specifiers)
            .finish()
    }
}
