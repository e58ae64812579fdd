//! Pattern compilation (spec §4.5.1): grammar queries compile lazily through
//! `codelens-parse`'s own per-language cache; handwritten/regex patterns
//! compile lazily here, cached per pattern source string.

use std::sync::Arc;

use dashmap::DashMap;
use regex::Regex;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("invalid regex: {0}")]
    InvalidRegex(String),
}

/// Lazily compiles and caches regex patterns. Shared across threads; a
/// `DashMap` gives the same lock-free-steady-state discipline the spec
/// asks of the compiled-query cache (§5).
#[derive(Default)]
pub struct RegexCache {
    cache: DashMap<String, Arc<Regex>>,
}

impl RegexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&self, source: &str) -> Result<Arc<Regex>, CompileError> {
        if let Some(existing) = self.cache.get(source) {
            return Ok(existing.clone());
        }
        let regex = Regex::new(source).map_err(|e| CompileError::InvalidRegex(e.to_string()))?;
        let regex = Arc::new(regex);
        self.cache.insert(source.to_string(), regex.clone());
        Ok(regex)
    }
}
