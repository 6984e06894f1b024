// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Developer-friendly macros for the Quill module runtime.
//!
//! # Macros Overview
//!
//! ## Namespaces
//! - [`exports!`] - Build a `quill_node::Namespace` from an export literal
//!
//! ## Testing
//! - [`assert_ok!`] - Assert a Result is Ok and extract the value
//! - [`assert_err!`] - Assert a Result is Err and extract the error
//! - [`assert_node_error!`] - Assert a Result failed with a given `NodeError` variant
//! - [`assert_same!`] - Assert two namespace handles are the same object
//! - [`assert_distinct!`] - Assert two namespace handles are different objects
//!
//! The namespace macros expand to paths under `::quill_node`, so they are
//! meant to be used from `quill-node` and crates depending on it.
//!
//! # Examples
//!
//! ```ignore
//! use quill_macros::exports;
//! use quill_node::Value;
//!
//! let ns = exports! {
//!     "sep" => "/",
//!     "answer" => 42.0,
//!     "noop" => Value::function("noop", |_| Ok(Value::Undefined)),
//! };
//! assert_eq!(ns.keys(), vec!["sep", "answer", "noop"]);
//! ```

#![warn(missing_docs)]

mod js;
mod testing;
