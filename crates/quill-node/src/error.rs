// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module runtime

use thiserror::Error;

/// Result type for module runtime operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// Errors that can occur while requiring built-in modules
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NodeError {
    /// Module not found
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    /// Invalid argument passed to require()
    #[error("The argument 'id' must be a non-empty string. Received {0}")]
    InvalidArgValue(String),

    /// A namespace builder failed; nothing was cached
    #[error("Failed to build module '{specifier}': {reason}")]
    Builder {
        /// Module specifier
        specifier: String,
        /// Reason reported by the builder
        reason: String,
    },

    /// A builder required its own specifier while building it
    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    /// Type error (wrong argument type)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Configuration error
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl NodeError {
    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a module not found error
    pub fn module_not_found(module: impl Into<String>) -> Self {
        Self::ModuleNotFound(module.into())
    }

    /// Create a builder failure for `specifier`
    pub fn builder(specifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Builder {
            specifier: specifier.into(),
            reason: reason.into(),
        }
    }

    /// The Node.js `error.code` for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ModuleNotFound(_) => "MODULE_NOT_FOUND",
            Self::InvalidArgValue(_) => "ERR_INVALID_ARG_VALUE",
            Self::Builder { .. } => "ERR_INTERNAL_ASSERTION",
            Self::CircularDependency(_) => "ERR_REQUIRE_CYCLE_MODULE",
            Self::TypeError(_) => "ERR_INVALID_ARG_TYPE",
            Self::Config(_) => "ERR_INVALID_CONFIG",
        }
    }

    /// The JavaScript exception class this error is thrown as
    pub fn exception_name(&self) -> &'static str {
        match self {
            Self::InvalidArgValue(_) | Self::TypeError(_) => "TypeError",
            Self::ModuleNotFound(_)
            | Self::Builder { .. }
            | Self::CircularDependency(_)
            | Self::Config(_) => "Error",
        }
    }

    /// Returns true if this is a `ModuleNotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ModuleNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_matches_node() {
        let err = NodeError::module_not_found("node:nope");
        assert_eq!(err.to_string(), "Cannot find module 'node:nope'");
        assert_eq!(err.code(), "MODULE_NOT_FOUND");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_builder_error_is_not_not_found() {
        let err = NodeError::builder("node:util", "boom");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Failed to build module 'node:util': boom");
    }

    #[test]
    fn test_exception_names() {
        assert_eq!(NodeError::module_not_found("x").exception_name(), "Error");
        assert_eq!(NodeError::InvalidArgValue("''".into()).exception_name(), "TypeError");
        assert_eq!(NodeError::type_error("bad").exception_name(), "TypeError");
        assert_eq!(NodeError::CircularDependency("node:a".into()).exception_name(), "Error");
    }
}
