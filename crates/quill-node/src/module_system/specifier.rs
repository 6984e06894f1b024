// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module specifiers and built-in name normalization

use crate::error::{NodeError, Result};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// URL scheme prefix for Node.js built-in modules
pub const NODE_SCHEME: &str = "node:";

/// Built-ins that can only be loaded with the `node:` prefix
pub const NODE_PREFIX_ONLY: &[&str] = &["sea", "sqlite", "test", "test/reporters"];

/// An immutable module specifier, compared by characters only
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Specifier(Arc<str>);

impl Specifier {
    /// Create a specifier without validation
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(Arc::from(raw.as_ref()))
    }

    /// Parse a user-supplied specifier, rejecting the empty string
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(NodeError::InvalidArgValue("''".to_string()));
        }
        Ok(Self::new(raw))
    }

    /// The specifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the specifier carries the `node:` scheme
    pub fn is_qualified(&self) -> bool {
        self.0.starts_with(NODE_SCHEME)
    }

    /// Name without the `node:` scheme
    pub fn bare_name(&self) -> &str {
        self.0.strip_prefix(NODE_SCHEME).unwrap_or(&self.0)
    }

    /// Normalize a specifier for registry lookup.
    ///
    /// Qualified specifiers are returned unchanged. A bare name is qualified
    /// when `allow_bare` is set and the module is not prefix-only; otherwise
    /// it is returned unchanged.
    pub fn normalize(&self, allow_bare: bool) -> Specifier {
        if self.is_qualified() || !allow_bare || NODE_PREFIX_ONLY.contains(&self.as_str()) {
            return self.clone();
        }
        Specifier::new(format!("{}{}", NODE_SCHEME, self.0))
    }

    /// The `node:`-qualified form, regardless of configuration
    pub fn qualified(&self) -> Specifier {
        if self.is_qualified() {
            self.clone()
        } else {
            Specifier::new(format!("{}{}", NODE_SCHEME, self.0))
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl Borrow<str> for Specifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Specifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Specifier {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}
