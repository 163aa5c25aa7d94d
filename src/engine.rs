//! Engine facade: configuration plus a shared pattern cache.

use std::sync::Arc;

use crate::cache::PatternCache;
use crate::config::EngineConfig;
use crate::error::{ConfigError, PatternSyntaxError, ResourceExceeded, Result};
use crate::finder::{FindOptions, Match, Matches};
use crate::pattern::CompiledPattern;

/// Entry point for callers that search many texts with recurring patterns.
///
/// `Engine` is `Sync`; share one between threads behind an `Arc` or a
/// reference and call it concurrently.
pub struct Engine {
    config: EngineConfig,
    cache: PatternCache,
}

impl Engine {
    /// Build an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            "engine ready: cache capacity {}, step budget {}",
            config.cache_capacity,
            config.step_budget
        );
        let cache = PatternCache::new(config.cache_capacity);
        Ok(Engine { config, cache })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Compile `pattern`, reusing a cached compilation when present.
    pub fn compile(
        &self,
        pattern: &str,
    ) -> std::result::Result<Arc<CompiledPattern>, PatternSyntaxError> {
        self.cache.get_or_compile(pattern)
    }

    fn options(&self) -> FindOptions {
        FindOptions::from(&self.config)
    }

    /// Lazily find matches of `compiled` in `text` using the engine settings.
    pub fn find_iter<'p, 't>(&self, compiled: &'p CompiledPattern, text: &'t str) -> Matches<'p, 't> {
        compiled.find_iter(text, self.options())
    }

    /// All matches of `compiled` in `text`, in document order.
    pub fn find_all(
        &self,
        compiled: &CompiledPattern,
        text: &str,
    ) -> std::result::Result<Vec<Match>, ResourceExceeded> {
        compiled.find_all(text, self.options())
    }

    /// Compile `pattern` and return the matched substrings of `text`.
    pub fn find_matches(&self, pattern: &str, text: &str) -> Result<Vec<String>> {
        let compiled = self.compile(pattern)?;
        let found = self.find_all(&compiled, text)?;
        Ok(found.into_iter().map(|m| m.text).collect())
    }
}

impl Default for Engine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Engine {
            cache: PatternCache::new(config.cache_capacity),
            config,
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
