// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Built-in Node.js modules
//!
//! Each module exposes a `create_module()` that builds a fresh namespace.
//! Caching is the registry's job, not the module's.

pub mod buffer;
pub mod path;
pub mod timers;
pub mod timers_promises;
pub mod util;
