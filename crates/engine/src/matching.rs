//! Matching contract and state machine (spec §4.5.2, §4.5.7): the single
//! entry point `matches(source, pattern, tree, context) -> [PatternMatch]`,
//! dispatched by `pattern.variant`.

use std::collections::HashMap;
use std::sync::Arc;

use codelens_core::{
    capture_from_node, sort_matches_in_source_order, strategy_weight, Capture, MatchStrategy, Pattern,
    PatternContext, PatternMatch, PatternPerformanceMetrics, PatternVariant, ParseTree, ParserKind,
    PredicateResult, RecoveryMetrics, UnifiedNode,
};
use codelens_parse::backends::{GrammarParser, QueryOptions};
use codelens_parse::ParserDispatch;
use regex::Regex;

use crate::adapt::adapt_pattern;
use crate::catalog::PatternCatalog;
use crate::compile::RegexCache;
use crate::resilient::{recover, RecoveryOutcome};

/// Everything a single `matches` call needs beyond the pattern and tree
/// themselves: the grammar parser pool (to run structural queries), the
/// regex compiler cache, and the catalog (to resolve fallback pattern names).
pub struct MatchRunner<'a> {
    pub dispatch: &'a ParserDispatch,
    pub regex_cache: &'a RegexCache,
    pub catalog: &'a PatternCatalog,
    /// Soft caps applied to every grammar query (spec §4.5.3), sourced from
    /// `EngineConfig::default_match_limit`/`default_timeout_micros`.
    pub default_match_limit: usize,
    pub default_timeout_micros: u64,
}

impl<'a> MatchRunner<'a> {
    pub fn new(
        dispatch: &'a ParserDispatch,
        regex_cache: &'a RegexCache,
        catalog: &'a PatternCatalog,
        default_match_limit: usize,
        default_timeout_micros: u64,
    ) -> Self {
        Self {
            dispatch,
            regex_cache,
            catalog,
            default_match_limit,
            default_timeout_micros,
        }
    }

    /// Runs one pattern against one already-parsed tree, returning matches in
    /// source order. Never panics or propagates compile/execution errors;
    /// per spec §4.5.8 those are absorbed into an empty result plus metrics.
    pub fn matches(
        &self,
        source: &str,
        pattern: &Pattern,
        tree: &ParseTree,
        context: &PatternContext,
        metrics: &PatternPerformanceMetrics,
        recovery_metrics: &RecoveryMetrics,
    ) -> Vec<PatternMatch> {
        let started = std::time::Instant::now();

        // Open Question #1: parser_kind follows the tree, not the pattern.
        // A pattern with a structural `query` against a tree the Grammar
        // backend didn't produce can't run that query at all.
        let grammar_query_runnable = pattern.query.is_some() && tree.parser_kind() == ParserKind::Grammar;

        let primary = if grammar_query_runnable {
            self.run_grammar_query(pattern, tree, context, MatchStrategy::Primary)
        } else if pattern.regex.is_some() {
            self.run_regex(pattern, source, MatchStrategy::Primary)
        } else {
            Vec::new()
        };

        if !primary.is_empty() {
            metrics.record_hit(started.elapsed().as_micros() as u64);
            let mut out = primary;
            sort_matches_in_source_order(&mut out);
            return out;
        }
        metrics.record_miss();

        match pattern.variant {
            PatternVariant::Base => Vec::new(),
            PatternVariant::Adaptive => {
                let mut out = self.run_adaptive(pattern, source, tree, context);
                sort_matches_in_source_order(&mut out);
                out
            }
            PatternVariant::Resilient => {
                let outcome = recover(self, pattern, source, tree, context);
                match outcome {
                    RecoveryOutcome::Recovered { matches, strategy, elapsed_micros } => {
                        recovery_metrics.record_attempt(true, elapsed_micros, Some(strategy));
                        let mut out = matches;
                        for m in &mut out {
                            m.strategy = strategy;
                            m.confidence = pattern.confidence * strategy_weight(strategy);
                        }
                        sort_matches_in_source_order(&mut out);
                        out
                    }
                    RecoveryOutcome::Exhausted { elapsed_micros } => {
                        recovery_metrics.record_attempt(false, elapsed_micros, None);
                        Vec::new()
                    }
                }
            }
        }
    }

    fn run_adaptive(
        &self,
        pattern: &Pattern,
        source: &str,
        tree: &ParseTree,
        context: &PatternContext,
    ) -> Vec<PatternMatch> {
        // "if pattern has a regex fallback, try it" (behavior matrix) happens
        // as part of the single-shot rewrite attempt below: `adapt_pattern`
        // either rewrites the query or retunes the regex fallback.
        if let Some(adapted) = adapt_pattern(pattern, tree, source) {
            if self.adapted_query_is_valid(&adapted, tree, context) {
                let grammar_runnable = adapted.query.is_some() && tree.parser_kind() == ParserKind::Grammar;
                let out = if grammar_runnable {
                    self.run_grammar_query(&adapted, tree, context, MatchStrategy::Adapted)
                } else if adapted.regex.is_some() {
                    self.run_regex(&adapted, source, MatchStrategy::Adapted)
                } else {
                    Vec::new()
                };
                if !out.is_empty() {
                    return out;
                }
            }
        }
        if pattern.regex.is_some() {
            return self.run_regex(pattern, source, MatchStrategy::Adapted);
        }
        Vec::new()
    }

    /// Validates a candidate rewrite before it's used: a query must still
    /// compile against the tree's grammar, a regex must still compile.
    /// Reverted (by returning `false`) otherwise, per spec §4.5.4.
    fn adapted_query_is_valid(&self, adapted: &Pattern, tree: &ParseTree, context: &PatternContext) -> bool {
        if let Some(query) = &adapted.query {
            if tree.parser_kind() == ParserKind::Grammar {
                let Some(parser) = self.dispatch.grammar_parser(&context.language_id) else {
                    return false;
                };
                let Some(grammar_parser) = parser.as_any().downcast_ref::<GrammarParser>() else {
                    return false;
                };
                if !grammar_parser.validate_query(query) {
                    return false;
                }
            }
        }
        if let Some(regex) = &adapted.regex {
            if Regex::new(regex).is_err() {
                return false;
            }
        }
        true
    }

    pub(crate) fn run_grammar_query(
        &self,
        pattern: &Pattern,
        tree: &ParseTree,
        context: &PatternContext,
        strategy: MatchStrategy,
    ) -> Vec<PatternMatch> {
        let Some(query_source) = &pattern.query else {
            return Vec::new();
        };
        let Some(grammar_tree) = tree.as_grammar() else {
            return Vec::new();
        };
        let Some(parser) = self.dispatch.grammar_parser(&context.language_id) else {
            return Vec::new();
        };
        let Some(grammar_parser) = parser.as_any().downcast_ref::<GrammarParser>() else {
            return Vec::new();
        };

        let opts = QueryOptions {
            timeout_micros: Some(self.default_timeout_micros),
            match_limit: u32::try_from(self.default_match_limit).ok(),
            byte_range: None,
        };
        let Ok((captures, query_metrics)) = grammar_parser.run_query(grammar_tree, query_source, opts) else {
            return Vec::new();
        };

        if query_metrics.exceeded_match_limit || query_metrics.exceeded_time_limit {
            self.catalog
                .metrics_for(&pattern.name)
                .record_limit_exceeded(query_metrics.exceeded_match_limit, query_metrics.exceeded_time_limit);
        }

        group_captures_into_matches(pattern, &captures, &grammar_tree.source, strategy)
    }

    pub(crate) fn run_regex(&self, pattern: &Pattern, source: &str, strategy: MatchStrategy) -> Vec<PatternMatch> {
        let Some(regex_source) = &pattern.regex else {
            return Vec::new();
        };
        let Ok(regex) = self.regex_cache.compile(regex_source) else {
            return Vec::new();
        };
        regex_matches_to_pattern_matches(pattern, &regex, source, strategy)
    }
}

/// Groups raw grammar captures into one `PatternMatch` per match, keyed by
/// the captures' shared span. `run_query` flattens matches already; each
/// contiguous run of captures sharing the tightest enclosing span is one
/// logical match.
fn group_captures_into_matches(
    pattern: &Pattern,
    raw: &[codelens_parse::backends::RawCapture],
    source: &std::sync::Arc<[u8]>,
    strategy: MatchStrategy,
) -> Vec<PatternMatch> {
    let mut by_match: std::collections::BTreeMap<usize, Vec<&codelens_parse::backends::RawCapture>> =
        std::collections::BTreeMap::new();
    for capture in raw {
        by_match.entry(capture.match_index).or_default().push(capture);
    }

    let mut matches = Vec::new();
    for captures_in_match in by_match.values() {
        let mut captures: HashMap<String, Vec<Capture>> = HashMap::new();
        let mut start_point = captures_in_match[0].start_point;
        let mut end_point = captures_in_match[0].end_point;
        let mut start_byte = captures_in_match[0].byte_range.start;
        let mut end_byte = captures_in_match[0].byte_range.end;

        for capture in captures_in_match {
            start_point = start_point.min(capture.start_point);
            end_point = end_point.max(capture.end_point);
            start_byte = start_byte.min(capture.byte_range.start);
            end_byte = end_byte.max(capture.byte_range.end);
            let text = std::str::from_utf8(&source[capture.byte_range.start..capture.byte_range.end])
                .unwrap_or("")
                .to_string();
            captures.entry(capture.capture_name.clone()).or_default().push(Capture {
                capture_name: capture.capture_name.clone(),
                text,
                start_point: capture.start_point,
                end_point: capture.end_point,
                byte_range: capture.byte_range,
            });
        }

        let text = std::str::from_utf8(&source[start_byte..end_byte]).unwrap_or("").to_string();
        matches.push(PatternMatch {
            pattern_name: pattern.name.clone(),
            captures,
            text,
            start_point,
            end_point,
            predicate_results: Vec::new(),
            strategy,
            confidence: pattern.confidence * strategy_weight(strategy),
        });
    }
    matches
}

fn regex_matches_to_pattern_matches(
    pattern: &Pattern,
    regex: &Arc<Regex>,
    source: &str,
    strategy: MatchStrategy,
) -> Vec<PatternMatch> {
    let mut out = Vec::new();
    for m in regex.find_iter(source) {
        let start_point = point_at(source, m.start());
        let end_point = point_at(source, m.end());
        out.push(PatternMatch {
            pattern_name: pattern.name.clone(),
            captures: HashMap::new(),
            text: m.as_str().to_string(),
            start_point,
            end_point,
            predicate_results: vec![PredicateResult {
                name: "regex_match".to_string(),
                succeeded: true,
            }],
            strategy,
            confidence: pattern.confidence * strategy_weight(strategy),
        });
    }
    out
}

/// Converts a byte offset into a `Point` by scanning newlines. Regex matches
/// only ever run over small files/windows so this stays linear-but-cheap.
pub(crate) fn point_at(source: &str, byte_offset: usize) -> codelens_core::Point {
    let mut row = 0;
    let mut last_newline = 0;
    for (idx, b) in source.as_bytes().iter().enumerate().take(byte_offset) {
        if *b == b'\n' {
            row += 1;
            last_newline = idx + 1;
        }
    }
    codelens_core::Point::new(row, byte_offset.saturating_sub(last_newline))
}

/// Converts a `UnifiedNode` match produced by the partial-match strategy into
/// a `Capture` for the match's root capture slot.
pub(crate) fn node_as_match(
    pattern: &Pattern,
    node: &UnifiedNode,
    source: &[u8],
    strategy: MatchStrategy,
) -> PatternMatch {
    let mut captures = HashMap::new();
    captures.insert("node".to_string(), vec![capture_from_node("node", node, source)]);
    PatternMatch {
        pattern_name: pattern.name.clone(),
        captures,
        text: node.text(source).to_string(),
        start_point: node.start_point,
        end_point: node.end_point,
        predicate_results: Vec::new(),
        strategy,
        confidence: pattern.confidence * strategy_weight(strategy),
    }
}
