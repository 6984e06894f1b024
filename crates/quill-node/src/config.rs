// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime configuration for the module registry.

use crate::error::{NodeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of the environment variables read by [`RuntimeConfig::apply_env`]
pub const ENV_PREFIX: &str = "QUILL_";

/// Configuration for a registry and the CLI that hosts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Accept `require('buffer')` as well as `require('node:buffer')`
    pub allow_bare_specifiers: bool,

    /// Built-ins removed from the table; bare or qualified names
    pub disabled_builtins: Vec<String>,

    /// `tracing-subscriber` filter directive
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            allow_bare_specifiers: true,
            disabled_builtins: Vec::new(),
            log_filter: "quill_node=warn".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Override settings from `QUILL_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(std::env::vars())
    }

    /// Override settings from `(name, value)` pairs.
    ///
    /// Unrelated names are ignored.
    pub fn apply_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(key) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            match key {
                "ALLOW_BARE_SPECIFIERS" => self.allow_bare_specifiers = parse_bool(key, value)?,
                "DISABLED_BUILTINS" => {
                    self.disabled_builtins = value
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(String::from)
                        .collect();
                }
                "LOG" => self.log_filter = value.to_string(),
                _ => {}
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(NodeError::Config(format!(
            "{}{} expects a boolean, got '{}'",
            ENV_PREFIX, key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert!(config.allow_bare_specifiers);
        assert!(config.disabled_builtins.is_empty());
        assert_eq!(config.log_filter, "quill_node=warn");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str("disabled_builtins = [\"util\"]\n").unwrap();
        assert_eq!(config.disabled_builtins, vec!["util"]);
        assert!(config.allow_bare_specifiers);
    }

    #[test]
    fn test_invalid_toml() {
        let err = RuntimeConfig::from_toml_str("allow_bare_specifiers = \"maybe\"").unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "allow_bare_specifiers = false").unwrap();
        writeln!(file, "log_filter = \"quill_node=debug\"").unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert!(!config.allow_bare_specifiers);
        assert_eq!(config.log_filter, "quill_node=debug");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuntimeConfig::load(&dir.path().join("quill.toml")).unwrap_err();
        assert_eq!(err.code(), "ERR_INVALID_CONFIG");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RuntimeConfig {
            disabled_builtins: vec!["node:path".to_string()],
            ..RuntimeConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(RuntimeConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RuntimeConfig::default();
        config
            .apply_vars([
                ("QUILL_ALLOW_BARE_SPECIFIERS", "off"),
                ("QUILL_DISABLED_BUILTINS", "util, node:path,,"),
                ("QUILL_LOG", "quill_node=trace"),
                ("PATH", "/usr/bin"),
            ])
            .unwrap();
        assert!(!config.allow_bare_specifiers);
        assert_eq!(config.disabled_builtins, vec!["util", "node:path"]);
        assert_eq!(config.log_filter, "quill_node=trace");
    }

    #[test]
    fn test_env_rejects_bad_bool() {
        let mut config = RuntimeConfig::default();
        let err = config
            .apply_vars([("QUILL_ALLOW_BARE_SPECIFIERS", "sometimes")])
            .unwrap_err();
        assert!(err.to_string().contains("QUILL_ALLOW_BARE_SPECIFIERS"));
    }
}
