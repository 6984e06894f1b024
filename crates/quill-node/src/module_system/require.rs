// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS require() front-end for built-in modules

use crate::error::{NodeError, Result};
use crate::module_system::registry::ModuleRegistry;
use crate::module_system::specifier::Specifier;
use crate::namespace::Namespace;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Base context a require function was created for.
///
/// Only used for diagnostics: built-in modules resolve the same way from
/// every context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireContext {
    filename: PathBuf,
}

impl RequireContext {
    /// Context for the module at `filename`
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    /// The module filename
    pub fn filename(&self) -> &Path {
        &self.filename
    }
}

impl Default for RequireContext {
    fn default() -> Self {
        Self::new("<anonymous>")
    }
}

/// A `require` function bound to a context and a registry.
///
/// Stateless apart from those two references; any number of front-ends may
/// share one registry.
#[derive(Debug, Clone)]
pub struct Require {
    registry: Arc<ModuleRegistry>,
    context: RequireContext,
}

/// `module.createRequire()` over the process-wide registry
pub fn create_require(context: RequireContext) -> Require {
    create_require_in(ModuleRegistry::global(), context)
}

/// `module.createRequire()` over an injected registry
pub fn create_require_in(registry: Arc<ModuleRegistry>, context: RequireContext) -> Require {
    Require { registry, context }
}

impl Require {
    /// `require(specifier)`
    pub fn call(&self, specifier: &str) -> Result<Namespace> {
        let specifier = self.normalize(specifier)?;
        self.registry.get_or_create(&specifier)
    }

    /// `require.resolve(specifier)` - the canonical specifier, without loading
    pub fn resolve(&self, specifier: &str) -> Result<String> {
        let specifier = self.normalize(specifier)?;
        if self.registry.is_known(specifier.as_str()) {
            Ok(specifier.to_string())
        } else {
            Err(NodeError::module_not_found(specifier.as_str()))
        }
    }

    /// `require.cache` - handles to every loaded namespace
    pub fn cache(&self) -> Vec<(Specifier, Namespace)> {
        self.registry
            .cached_specifiers()
            .into_iter()
            .filter_map(|spec| self.registry.get(&spec).map(|ns| (spec, ns)))
            .collect()
    }

    /// The context this front-end was created for
    pub fn context(&self) -> &RequireContext {
        &self.context
    }

    /// The registry this front-end delegates to
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Qualify a bare built-in name; anything the registry cannot build
    /// keeps the spelling the caller used, so errors name it as written.
    fn normalize(&self, specifier: &str) -> Result<Specifier> {
        let written = Specifier::parse(specifier)?;
        let qualified = written.normalize(self.registry.allow_bare_specifiers());
        if qualified != written && !self.registry.is_known(qualified.as_str()) {
            return Ok(written);
        }
        Ok(qualified)
    }
}

/// `module.builtinModules` - every built-in `registry` can build, sorted
pub fn builtin_modules(registry: &ModuleRegistry) -> Vec<String> {
    registry
        .known_specifiers()
        .into_iter()
        .map(|spec| spec.to_string())
        .collect()
}

/// `module.isBuiltin(specifier)`
pub fn is_builtin(registry: &ModuleRegistry, specifier: &str) -> bool {
    Specifier::parse(specifier)
        .map(|spec| registry.is_known(spec.normalize(true).as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn fresh() -> Arc<ModuleRegistry> {
        Arc::new(ModuleRegistry::with_node_builtins())
    }

    #[test]
    fn test_front_ends_share_registry() {
        let registry = fresh();
        let a = create_require_in(Arc::clone(&registry), RequireContext::new("/app/a.js"));
        let b = create_require_in(Arc::clone(&registry), RequireContext::new("/app/lib/b.js"));

        let from_a = a.call("node:timers").unwrap();
        let from_b = b.call("node:timers").unwrap();
        assert!(Namespace::ptr_eq(&from_a, &from_b));

        from_a.set("marker", Value::Boolean(true));
        assert_eq!(from_b.get("marker"), Some(Value::Boolean(true)));
    }

    #[test]
    fn test_bare_and_qualified_share_entry() {
        let require = create_require_in(fresh(), RequireContext::default());
        let bare = require.call("buffer").unwrap();
        let qualified = require.call("node:buffer").unwrap();
        assert!(Namespace::ptr_eq(&bare, &qualified));
    }

    #[test]
    fn test_bare_rejected_when_disabled() {
        let mut registry = ModuleRegistry::with_node_builtins();
        registry.set_allow_bare_specifiers(false);
        let require = create_require_in(Arc::new(registry), RequireContext::default());
        assert_eq!(
            require.call("buffer").unwrap_err(),
            NodeError::ModuleNotFound("buffer".to_string())
        );
        assert!(require.call("node:buffer").is_ok());
    }

    #[test]
    fn test_errors_propagate_unchanged() {
        let require = create_require_in(fresh(), RequireContext::default());
        assert_eq!(
            require.call("node:does-not-exist").unwrap_err(),
            NodeError::ModuleNotFound("node:does-not-exist".to_string())
        );
        assert!(matches!(
            require.call("").unwrap_err(),
            NodeError::InvalidArgValue(_)
        ));
    }

    #[test]
    fn test_unknown_bare_name_reported_as_written() {
        let require = create_require_in(fresh(), RequireContext::default());
        assert_eq!(
            require.call("lodash").unwrap_err(),
            NodeError::ModuleNotFound("lodash".to_string())
        );
        assert_eq!(
            require.resolve("left-pad").unwrap_err(),
            NodeError::ModuleNotFound("left-pad".to_string())
        );
        assert_eq!(
            require.call("test").unwrap_err(),
            NodeError::ModuleNotFound("test".to_string())
        );
    }

    #[test]
    fn test_resolve_does_not_load() {
        let registry = fresh();
        let require = create_require_in(Arc::clone(&registry), RequireContext::default());
        assert_eq!(require.resolve("util").unwrap(), "node:util");
        assert!(registry.is_empty());
        assert!(require.resolve("lodash").unwrap_err().is_not_found());
    }

    #[test]
    fn test_cache_lists_loaded_handles() {
        let require = create_require_in(fresh(), RequireContext::default());
        let util = require.call("node:util").unwrap();
        let cache = require.cache();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache[0].0.as_str(), "node:util");
        assert!(Namespace::ptr_eq(&cache[0].1, &util));
    }

    #[test]
    fn test_builtin_helpers() {
        let registry = fresh();
        assert!(is_builtin(&registry, "timers/promises"));
        assert!(is_builtin(&registry, "node:timers/promises"));
        assert!(!is_builtin(&registry, ""));
        assert!(!is_builtin(&registry, "express"));
        assert!(builtin_modules(&registry).contains(&"node:buffer".to_string()));
    }
}
