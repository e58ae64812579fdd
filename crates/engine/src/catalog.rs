//! Pattern catalog: registry, relationship graph, and per-pattern metrics.
//!
//! Resolves spec §9's second open question explicitly: learner-accepted
//! improvements *coexist* with the original pattern under a separate slot;
//! the improved pattern takes precedence when both would match, and the
//! original remains available for rollback.

use std::sync::Arc;

use codelens_core::{FastMap, Pattern, PatternPerformanceMetrics, PatternRelationship, RecoveryMetrics};

/// Key identifying one registered pattern slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PatternKey {
    language_id: String,
    name: String,
}

#[derive(Default)]
pub struct PatternCatalog {
    originals: FastMap<PatternKey, Pattern>,
    /// Learner-accepted rewrites, stored separately from `originals` so the
    /// original is always available for rollback (spec §9).
    improved: FastMap<PatternKey, Pattern>,
    relationships: FastMap<String, Vec<PatternRelationship>>,
    metrics: FastMap<String, Arc<PatternPerformanceMetrics>>,
    recovery_metrics: FastMap<String, Arc<RecoveryMetrics>>,
}

impl PatternCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_pattern(&self, pattern: Pattern) {
        assert!(pattern.is_valid(), "wildcard language id is only valid for Base patterns");
        for relationship in &pattern.metadata.relationships {
            self.relationships
                .entry(relationship.source_pattern.clone())
                .or_default()
                .push(relationship.clone());
        }
        let key = PatternKey {
            language_id: pattern.language_id.clone(),
            name: pattern.name.clone(),
        };
        self.metrics
            .entry(pattern.name.clone())
            .or_insert_with(|| Arc::new(PatternPerformanceMetrics::new()));
        self.recovery_metrics
            .entry(pattern.name.clone())
            .or_insert_with(|| Arc::new(RecoveryMetrics::default()));
        self.originals.insert(key, pattern);
    }

    pub fn register_language_patterns(&self, _language_id: &str, patterns: Vec<Pattern>) {
        for pattern in patterns {
            self.register_pattern(pattern);
        }
    }

    /// Register a learner-improved rewrite of an existing pattern. Does not
    /// replace the original.
    pub fn register_improved(&self, language_id: &str, name: &str, improved: Pattern) {
        let key = PatternKey {
            language_id: language_id.to_string(),
            name: name.to_string(),
        };
        self.improved.insert(key, improved);
    }

    /// The pattern that should actually run for `(language_id, name)`:
    /// the improved rewrite if one has been accepted, else the original.
    pub fn effective(&self, language_id: &str, name: &str) -> Option<Pattern> {
        let key = PatternKey {
            language_id: language_id.to_string(),
            name: name.to_string(),
        };
        self.improved
            .get(&key)
            .map(|p| p.clone())
            .or_else(|| self.originals.get(&key).map(|p| p.clone()))
    }

    pub fn original(&self, language_id: &str, name: &str) -> Option<Pattern> {
        let key = PatternKey {
            language_id: language_id.to_string(),
            name: name.to_string(),
        };
        self.originals.get(&key).map(|p| p.clone())
    }

    /// All patterns active for a language: its own plus any `"*"` wildcard
    /// patterns, with improved rewrites substituted in.
    pub fn patterns_for_language(&self, language_id: &str) -> Vec<Pattern> {
        let mut out = Vec::new();
        for entry in self.originals.iter() {
            let key = entry.key();
            if key.language_id == language_id || key.language_id == "*" {
                out.push(self.effective(&key.language_id, &key.name).unwrap());
            }
        }
        out
    }

    pub fn metrics_for(&self, pattern_name: &str) -> Arc<PatternPerformanceMetrics> {
        self.metrics
            .entry(pattern_name.to_string())
            .or_insert_with(|| Arc::new(PatternPerformanceMetrics::new()))
            .clone()
    }

    pub fn recovery_metrics_for(&self, pattern_name: &str) -> Arc<RecoveryMetrics> {
        self.recovery_metrics
            .entry(pattern_name.to_string())
            .or_insert_with(|| Arc::new(RecoveryMetrics::default()))
            .clone()
    }

    pub fn relationships_of(&self, pattern_name: &str) -> Vec<PatternRelationship> {
        self.relationships
            .get(pattern_name)
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}
