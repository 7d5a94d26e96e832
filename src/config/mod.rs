//! Configuration model for patchport.
//!
//! This module defines the Config struct that represents `patchport.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.
//! Every setting can be overridden from the command line.

use crate::error::{PortError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default patterns selecting which files under the patch directory are
/// treated as patches.
pub fn default_include() -> Vec<String> {
    vec!["*.patch".to_string()]
}

/// Configuration for batch conversion.
///
/// This struct represents the contents of `patchport.yaml`. Unknown fields
/// in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of parallel conversion workers.
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Context lines emitted around each reconciled hunk.
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    /// Wall-clock budget for a whole batch run, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Glob patterns (relative to the patch directory) selecting patch files.
    #[serde(default = "default_include")]
    pub include: Vec<String>,
}

// Default value functions for serde
fn default_jobs() -> usize {
    8
}
fn default_context_lines() -> usize {
    3
}
fn default_timeout_secs() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            context_lines: default_context_lines(),
            timeout_secs: default_timeout_secs(),
            include: default_include(),
        }
    }
}

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward
    /// compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            PortError::User(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from the given path, or fall back to defaults when the
    /// file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| PortError::User(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `jobs` must be positive
    /// - `timeout_secs` must be positive
    /// - `include` patterns must be non-empty and valid globs
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(PortError::User(
                "config validation failed: jobs must be greater than 0".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(PortError::User(
                "config validation failed: timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.include.is_empty() {
            return Err(PortError::User(
                "config validation failed: include must name at least one pattern".to_string(),
            ));
        }
        self.include_matcher()?;

        Ok(())
    }

    /// Compile the include patterns into a matcher.
    pub fn include_matcher(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.include {
            let glob = Glob::new(pattern).map_err(|e| {
                PortError::User(format!(
                    "config validation failed: invalid include pattern '{}': {}",
                    pattern, e
                ))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| PortError::User(format!("failed to compile include patterns: {}", e)))
    }
}
