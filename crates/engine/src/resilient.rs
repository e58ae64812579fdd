//! Resilient pattern recovery (spec §4.5.5): an ordered, pluggable strategy
//! list tried left to right until one makes progress.

use codelens_core::{MatchStrategy, ParseTree, Pattern, PatternContext};

use crate::matching::{node_as_match, MatchRunner};

pub enum RecoveryOutcome {
    Recovered {
        matches: Vec<codelens_core::PatternMatch>,
        strategy: MatchStrategy,
        elapsed_micros: u64,
    },
    Exhausted {
        elapsed_micros: u64,
    },
}

/// Line-window size for the partial-match strategy: large enough to cover
/// most function/block bodies, small enough to keep re-parses cheap.
const PARTIAL_MATCH_WINDOW_LINES: usize = 50;

/// Runs the three built-in recovery strategies in order: fallback patterns,
/// regex fallback, partial match over line windows. Stops at the first
/// strategy that produces matches.
pub fn recover(runner: &MatchRunner, pattern: &Pattern, source: &str, tree: &ParseTree, context: &PatternContext) -> RecoveryOutcome {
    let started = std::time::Instant::now();

    if let Some(matches) = try_fallback_patterns(runner, pattern, tree, context) {
        return RecoveryOutcome::Recovered {
            matches,
            strategy: MatchStrategy::FallbackPattern,
            elapsed_micros: started.elapsed().as_micros() as u64,
        };
    }

    if pattern.regex.is_some() {
        let matches = runner.run_regex(pattern, source, MatchStrategy::Regex);
        if !matches.is_empty() {
            return RecoveryOutcome::Recovered {
                matches,
                strategy: MatchStrategy::Regex,
                elapsed_micros: started.elapsed().as_micros() as u64,
            };
        }
    }

    if let Some(matches) = try_partial_match(runner, pattern, source, tree, context) {
        return RecoveryOutcome::Recovered {
            matches,
            strategy: MatchStrategy::PartialMatch,
            elapsed_micros: started.elapsed().as_micros() as u64,
        };
    }

    RecoveryOutcome::Exhausted {
        elapsed_micros: started.elapsed().as_micros() as u64,
    }
}

fn try_fallback_patterns(
    runner: &MatchRunner,
    pattern: &Pattern,
    tree: &ParseTree,
    context: &PatternContext,
) -> Option<Vec<codelens_core::PatternMatch>> {
    for fallback_name in &pattern.fallback_patterns {
        let Some(fallback) = runner.catalog.effective(&pattern.language_id, fallback_name) else {
            continue;
        };
        let matches = if fallback.query.is_some() && tree.parser_kind() == codelens_core::ParserKind::Grammar {
            runner.run_grammar_query(&fallback, tree, context, MatchStrategy::FallbackPattern)
        } else {
            Vec::new()
        };
        if !matches.is_empty() {
            return Some(matches);
        }
    }
    None
}

/// Re-parsing sub-ranges isn't available without a live parser for the
/// custom-tree case, so partial match walks the already-flattened tree in
/// fixed line windows and treats each node whose span falls fully inside a
/// window as a candidate match — a tree-native analogue of "re-parse
/// contiguous sub-ranges" that doesn't require a second parse pass.
fn try_partial_match(
    _runner: &MatchRunner,
    pattern: &Pattern,
    source: &str,
    tree: &ParseTree,
    _context: &PatternContext,
) -> Option<Vec<codelens_core::PatternMatch>> {
    let total_lines = source.lines().count().max(1);
    let root = tree.root();
    let mut matches = Vec::new();

    let mut window_start = 0;
    while window_start < total_lines {
        let window_end = (window_start + PARTIAL_MATCH_WINDOW_LINES).min(total_lines);
        for node in root.walk() {
            if node.start_point.row >= window_start && node.end_point.row < window_end && node_matches_kind(pattern, node) {
                matches.push(node_as_match(pattern, node, source.as_bytes(), MatchStrategy::PartialMatch));
            }
        }
        window_start = window_end;
    }

    if matches.is_empty() {
        None
    } else {
        Some(matches)
    }
}

/// A pattern's declared `query` often names the node kind it targets as its
/// first token (e.g. `"(function_definition) @fn"`); partial match uses
/// that as a cheap kind filter since it can't run the real query engine
/// over a synthetic window.
fn node_matches_kind(pattern: &Pattern, node: &codelens_core::UnifiedNode) -> bool {
    let Some(query) = &pattern.query else {
        return false;
    };
    query.contains(&node.kind)
}
