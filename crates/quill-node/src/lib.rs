// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # quill-node
//!
//! Built-in module registry for an embedded JavaScript runtime.
//!
//! `require('node:timers')`, `require('node:buffer')` and friends return a
//! namespace object that is built once per registry and then shared by every
//! caller:
//!
//! - The first request for a specifier runs its builder; every later request
//!   returns the same object.
//! - Namespaces are mutable. Patching `timers.setTimeout` is visible to every
//!   other holder of `timers`.
//! - Nothing is ever evicted. A failed build caches nothing, so the next
//!   request tries again.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quill_node::{create_require, RequireContext, Value};
//!
//! let require = create_require(RequireContext::new("/app/main.js"));
//! let timers = require.call("node:timers")?;
//! timers.set("setTimeout", Value::function("patched", |_| Ok(Value::Undefined)));
//!
//! let again = create_require(RequireContext::new("/app/lib.js")).call("node:timers")?;
//! assert!(quill_node::Namespace::ptr_eq(&timers, &again));
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # List the built-in modules
//! quill-node --list
//!
//! # Require modules and print their exports
//! quill-node node:timers node:util
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// `quill_macros::exports!` expands to `::quill_node::...` paths
extern crate self as quill_node;

pub mod config;
pub mod error;
pub mod module_system;
pub mod modules;
pub mod namespace;
pub mod value;

// Re-exports
pub use config::RuntimeConfig;
pub use error::{NodeError, Result};
pub use module_system::{
    builtin_modules, create_require, create_require_in, is_builtin, BuilderTable,
    ModuleRegistry, ModuleState, NamespaceBuilder, RegistryStats, Require, RequireContext,
    Specifier, NODE_PREFIX_ONLY, NODE_SCHEME,
};
pub use namespace::Namespace;
pub use value::{NativeFunction, Value};

/// Version of the quill-node runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Node.js API version compatibility target
pub const NODE_API_VERSION: &str = "20.0.0";
