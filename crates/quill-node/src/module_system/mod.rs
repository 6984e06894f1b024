// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Built-in module system
//!
//! `require(specifier)` flows through three layers:
//!
//! - [`Require`] normalizes the specifier and delegates
//! - [`ModuleRegistry`] returns the cached namespace, or builds it once
//! - [`NamespaceBuilder`] produces the initial namespace for a specifier
//!
//! Only built-in specifiers (`node:*`) are resolved; file paths and
//! `node_modules` lookups are not.

mod builder;
mod registry;
mod require;
mod specifier;

pub use builder::{BuilderTable, NamespaceBuilder};
pub use registry::{ModuleRegistry, ModuleState, RegistryStats};
pub use require::{
    builtin_modules, create_require, create_require_in, is_builtin, Require, RequireContext,
};
pub use specifier::{Specifier, NODE_PREFIX_ONLY, NODE_SCHEME};
