//! The `Engine` handle (spec §6): owns the parser pool, pattern catalog, and
//! config; exposes the inbound API (`classify`, `parse`, `match`,
//! `register_pattern`/`register_language_patterns`, `list_languages`, `learn`).

use std::path::Path;

use codelens_core::{
    EngineConfig, FileClassification, Pattern, PatternContext, PatternMatch, PatternPerformanceMetrics, RecoveryMetrics,
};
use codelens_parse::{ClassifyingDispatch, ParseResult};

use crate::catalog::PatternCatalog;
use crate::compile::RegexCache;
use crate::learner::{self, LearnerReport};
use crate::matching::MatchRunner;

pub struct Engine {
    facade: ClassifyingDispatch,
    catalog: PatternCatalog,
    regex_cache: RegexCache,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            facade: ClassifyingDispatch::with_binary_sniff(config.binary_sniff_window, config.binary_sniff_threshold),
            catalog: PatternCatalog::new(),
            regex_cache: RegexCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classify(&self, path: &str, bytes: &[u8]) -> FileClassification {
        self.facade
            .classifier
            .classify(path, bytes, |lang| self.facade.dispatch.has_handwritten(lang))
    }

    pub fn parse(&self, path: &str, bytes: &[u8]) -> ParseResult {
        self.facade.classify_and_parse(path, bytes)
    }

    pub fn register_pattern(&self, pattern: Pattern) {
        self.catalog.register_pattern(pattern);
    }

    pub fn register_language_patterns(&self, language_id: &str, patterns: Vec<Pattern>) {
        self.catalog.register_language_patterns(language_id, patterns);
    }

    pub fn list_languages(&self) -> Vec<String> {
        self.facade.dispatch.list_supported_languages()
    }

    /// Runs one named, already-registered pattern against a parsed file.
    pub fn matches_pattern(&self, source: &str, pattern_name: &str, parsed: &ParseResult, language_id: &str, file_path: &str) -> Vec<PatternMatch> {
        let Some(pattern) = self.catalog.effective(language_id, pattern_name) else {
            return Vec::new();
        };
        self.matches(source, &pattern, parsed, language_id, file_path)
    }

    /// Runs an arbitrary (possibly unregistered) pattern against a parsed
    /// file — the `match` operation of spec §6.
    pub fn matches(&self, source: &str, pattern: &Pattern, parsed: &ParseResult, language_id: &str, file_path: &str) -> Vec<PatternMatch> {
        let runner = MatchRunner::new(
            &self.facade.dispatch,
            &self.regex_cache,
            &self.catalog,
            self.config.default_match_limit,
            self.config.default_timeout_micros,
        );
        let context = PatternContext {
            parser_kind: parsed.tree.parser_kind(),
            ..PatternContext::new(language_id, file_path)
        };
        let metrics = self.catalog.metrics_for(&pattern.name);
        let recovery_metrics = self.catalog.recovery_metrics_for(&pattern.name);
        runner.matches(source, pattern, &parsed.tree, &context, &metrics, &recovery_metrics)
    }

    pub fn metrics_for(&self, pattern_name: &str) -> std::sync::Arc<PatternPerformanceMetrics> {
        self.catalog.metrics_for(pattern_name)
    }

    pub fn recovery_metrics_for(&self, pattern_name: &str) -> std::sync::Arc<RecoveryMetrics> {
        self.catalog.recovery_metrics_for(pattern_name)
    }

    /// Runs the cross-project learner for `language_id` over `project_root`
    /// (spec §4.5.6), registering any accepted improvements.
    pub fn learn(&self, language_id: &str, project_root: &Path) -> LearnerReport {
        learner::learn(
            language_id,
            project_root,
            &self.catalog,
            &self.facade.dispatch,
            &self.regex_cache,
            &self.config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_core::{PatternCategory, PatternMetadata, PatternPurpose, PatternVariant};

    fn function_pattern() -> Pattern {
        Pattern {
            name: "python_function".to_string(),
            language_id: "python".to_string(),
            category: PatternCategory::Structure,
            purpose: PatternPurpose::Understanding,
            confidence: 0.9,
            variant: PatternVariant::Base,
            query: Some("(function_definition name: (identifier) @name) @fn".to_string()),
            regex: None,
            fallback_patterns: Vec::new(),
            metadata: PatternMetadata::default(),
        }
    }

    #[test]
    fn classify_parse_and_match_python_function() {
        let engine = Engine::default();
        engine.register_pattern(function_pattern());
        let source = "def greet(name):\n    return name\n";
        let classification = engine.classify("a.py", source.as_bytes());
        assert_eq!(classification.language_id, "python");

        let parsed = engine.parse("a.py", source.as_bytes());
        assert!(parsed.success);

        let matches = engine.matches_pattern(source, "python_function", &parsed, "python", "a.py");
        assert_eq!(matches.len(), 1);
        assert!(matches[0].captures.contains_key("name"));
    }

    #[test]
    fn unregistered_pattern_name_yields_no_matches() {
        let engine = Engine::default();
        let parsed = engine.parse("a.py", b"x = 1\n");
        let matches = engine.matches_pattern("x = 1\n", "does_not_exist", &parsed, "python", "a.py");
        assert!(matches.is_empty());
    }
}
