//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields a working configuration:
//!
//! ```toml
//! cache_capacity = 256
//! step_budget = 1000000
//! offsets = "absolute"          # or "line"
//! on_budget_exceeded = "skip"   # or "abort"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Centralized default values.
pub mod defaults {
    /// Compiled patterns kept by the cache.
    pub const CACHE_CAPACITY: usize = 256;

    /// Instruction steps allowed for a single match attempt.
    pub const STEP_BUDGET: u64 = 1_000_000;
}

/// Coordinates used for reported match offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetMode {
    /// Byte offsets into the whole input text.
    #[default]
    Absolute,
    /// Byte offsets into the line the match was found on.
    Line,
}

/// What a scan does when one match attempt exhausts its step budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPolicy {
    /// Abandon that attempt and keep scanning from the next position.
    #[default]
    Skip,
    /// Report the exhaustion and stop the scan.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub cache_capacity: usize,
    pub step_budget: u64,
    pub offsets: OffsetMode,
    pub on_budget_exceeded: BudgetPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: defaults::CACHE_CAPACITY,
            step_budget: defaults::STEP_BUDGET,
            offsets: OffsetMode::default(),
            on_budget_exceeded: BudgetPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loading engine config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "cache_capacity",
            });
        }
        if self.step_budget == 0 {
            return Err(ConfigError::Zero {
                field: "step_budget",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
