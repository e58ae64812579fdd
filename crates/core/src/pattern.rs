use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tree::{ByteRange, Point, UnifiedNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternCategory {
    Syntax,
    Semantics,
    Structure,
    Documentation,
    CodePatterns,
    Learning,
    BestPractices,
    CommonIssues,
    UserPatterns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternPurpose {
    Understanding,
    Learning,
    Validation,
    Generation,
}

/// Variant is part of pattern identity (spec §3, Pattern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternVariant {
    Base,
    Adaptive,
    Resilient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    Uses,
    Contains,
    Complements,
    Implements,
    References,
    DependsOn,
    AppliesTo,
    ReferencedBy,
}

/// A directed edge in the (possibly cyclic) pattern relationship graph.
/// Stored by name, never by direct reference, per spec §9.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRelationship {
    pub source_pattern: String,
    pub target_pattern: String,
    pub relation: RelationKind,
    pub confidence: f32,
}

/// A named test case a pattern must keep matching across adaptation/learning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternTestCase {
    pub name: String,
    pub source: String,
    pub expected_match_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternMetadata {
    pub relationships: Vec<PatternRelationship>,
    pub test_cases: Vec<PatternTestCase>,
    pub adapted: bool,
    pub fields: HashMap<String, String>,
}

/// A named, typed, language-scoped structural query, optionally backed by a
/// regex fallback and an extraction transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    pub language_id: String,
    pub category: PatternCategory,
    pub purpose: PatternPurpose,
    pub confidence: f32,
    pub variant: PatternVariant,
    pub query: Option<String>,
    pub regex: Option<String>,
    pub fallback_patterns: Vec<String>,
    pub metadata: PatternMetadata,
}

impl Pattern {
    pub fn is_wildcard_language(&self) -> bool {
        self.language_id == "*"
    }

    /// Spec invariant: `language_id == "*"` is valid only for the Base variant.
    pub fn is_valid(&self) -> bool {
        !self.is_wildcard_language() || self.variant == PatternVariant::Base
    }
}

/// Strategy weight applied to a pattern's declared confidence, per spec §9.
pub fn strategy_weight(strategy: MatchStrategy) -> f32 {
    match strategy {
        MatchStrategy::Primary => 1.0,
        MatchStrategy::Adapted => 0.9,
        MatchStrategy::FallbackPattern => 0.8,
        MatchStrategy::Regex => 0.7,
        MatchStrategy::PartialMatch => 0.6,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrategy {
    Primary,
    Adapted,
    FallbackPattern,
    Regex,
    PartialMatch,
}

/// Per-invocation context passed to `matches`. Never persisted verbatim.
#[derive(Debug, Clone)]
pub struct PatternContext {
    pub language_id: String,
    pub file_path: String,
    pub parser_kind: crate::classification::ParserKind,
    pub scope_level: usize,
    pub allows_nesting: bool,
    pub project_patterns: Vec<String>,
    pub relevant_patterns: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl PatternContext {
    pub fn new(language_id: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            language_id: language_id.into(),
            file_path: file_path.into(),
            parser_kind: crate::classification::ParserKind::Unknown,
            scope_level: 0,
            allows_nesting: true,
            project_patterns: Vec::new(),
            relevant_patterns: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

/// One named sub-match produced by running a pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    pub capture_name: String,
    pub text: String,
    pub start_point: Point,
    pub end_point: Point,
    pub byte_range: ByteRange,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredicateResult {
    pub name: String,
    pub succeeded: bool,
}

/// One match of a pattern against a source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern_name: String,
    pub captures: HashMap<String, Vec<Capture>>,
    pub text: String,
    pub start_point: Point,
    pub end_point: Point,
    pub predicate_results: Vec<PredicateResult>,
    pub strategy: MatchStrategy,
    pub confidence: f32,
}

impl PatternMatch {
    pub fn sort_key(&self) -> (Point, std::cmp::Reverse<Point>) {
        // Ascending start_point, ties broken by longer span first.
        (self.start_point, std::cmp::Reverse(self.end_point))
    }
}

/// Sorts matches in source order: ascending `start_point`, ties broken by
/// longer span first, as required by spec §5 "Ordering guarantees".
pub fn sort_matches_in_source_order(matches: &mut [PatternMatch]) {
    matches.sort_by(|a, b| {
        a.start_point.cmp(&b.start_point).then_with(|| {
            // Longer span first -> larger end_point sorts first.
            b.end_point.cmp(&a.end_point)
        })
    });
}

/// Helper used by handwritten regex patterns/extract transforms to build a
/// `Capture` from a byte span without going through a `UnifiedNode`.
pub fn capture_from_span(
    name: &str,
    source: &str,
    byte_range: ByteRange,
    start_point: Point,
    end_point: Point,
) -> Capture {
    Capture {
        capture_name: name.to_string(),
        text: source[byte_range.start..byte_range.end].to_string(),
        start_point,
        end_point,
        byte_range,
    }
}

/// Helper to build a `Capture` from a `UnifiedNode`.
pub fn capture_from_node(name: &str, node: &UnifiedNode, source: &[u8]) -> Capture {
    Capture {
        capture_name: name.to_string(),
        text: node.text(source).to_string(),
        start_point: node.start_point,
        end_point: node.end_point,
        byte_range: node.byte_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_match(name: &str, strategy: MatchStrategy, start: Point, end: Point) -> PatternMatch {
        PatternMatch {
            pattern_name: name.to_string(),
            captures: HashMap::new(),
            text: String::new(),
            start_point: start,
            end_point: end,
            predicate_results: Vec::new(),
            strategy,
            confidence: 1.0,
        }
    }

    #[test]
    fn strategy_weights_match_spec_table() {
        assert_eq!(strategy_weight(MatchStrategy::Primary), 1.0);
        assert_eq!(strategy_weight(MatchStrategy::Adapted), 0.9);
        assert_eq!(strategy_weight(MatchStrategy::FallbackPattern), 0.8);
        assert_eq!(strategy_weight(MatchStrategy::Regex), 0.7);
        assert_eq!(strategy_weight(MatchStrategy::PartialMatch), 0.6);
    }

    #[test]
    fn sort_matches_in_source_order_orders_by_start_then_longer_span_first() {
        let mut matches = vec![
            dummy_match("b", MatchStrategy::Primary, Point::new(1, 0), Point::new(1, 5)),
            dummy_match("a", MatchStrategy::Primary, Point::new(0, 0), Point::new(0, 10)),
            dummy_match("a_inner", MatchStrategy::Primary, Point::new(0, 0), Point::new(0, 3)),
        ];
        sort_matches_in_source_order(&mut matches);
        let names: Vec<&str> = matches.iter().map(|m| m.pattern_name.as_str()).collect();
        assert_eq!(names, vec!["a", "a_inner", "b"]);
    }
}
