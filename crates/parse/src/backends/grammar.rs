//! Grammar backend (spec §4.4.1): wraps `tree-sitter`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Instant;

use codelens_core::{flatten_tree_sitter, ByteRange, Diagnostic, DiagnosticKind, GrammarTree, ParseResult, ParseTree};
use dashmap::DashMap;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser as TsParser, Query, QueryCursor};

use crate::Parser;

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    pub timeout_micros: Option<u64>,
    pub match_limit: Option<u32>,
    pub byte_range: Option<ByteRange>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryMetrics {
    pub query_time_micros: u64,
    pub node_count: usize,
    pub capture_count: usize,
    pub exceeded_match_limit: bool,
    pub exceeded_time_limit: bool,
}

#[derive(Debug, Clone)]
pub struct RawCapture {
    /// Index of the `tree-sitter` match this capture belongs to. Multiple
    /// captures share a `match_index` when one query match binds several
    /// capture names (e.g. `@fn` and `@name` in the same match).
    pub match_index: usize,
    pub capture_name: String,
    pub byte_range: ByteRange,
    pub start_point: codelens_core::Point,
    pub end_point: codelens_core::Point,
}

/// A single language's grammar parser: holds the compiled `tree-sitter`
/// language plus a cache of compiled queries keyed by a hash of their
/// source text (spec §4.5.1: "compiled lazily on first use and cached").
pub struct GrammarParser {
    pub language_id: String,
    ts_language: tree_sitter::Language,
    query_cache: DashMap<u64, std::sync::Arc<Query>>,
}

fn hash_query_source(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

impl GrammarParser {
    pub fn new(language_id: impl Into<String>, ts_language: tree_sitter::Language) -> Self {
        Self {
            language_id: language_id.into(),
            ts_language,
            query_cache: DashMap::new(),
        }
    }

    /// Tries to compile `query_source` without caching it; used by adaptive
    /// rewrites to check a candidate before committing to it (spec §4.5.4:
    /// "any rewrite that fails to parse or compile is reverted").
    pub fn validate_query(&self, query_source: &str) -> bool {
        Query::new(&self.ts_language, query_source).is_ok()
    }

    fn compiled_query(&self, query_source: &str) -> Result<std::sync::Arc<Query>, String> {
        let key = hash_query_source(query_source);
        if let Some(cached) = self.query_cache.get(&key) {
            return Ok(cached.clone());
        }
        let query = Query::new(&self.ts_language, query_source).map_err(|e| e.to_string())?;
        let query = std::sync::Arc::new(query);
        self.query_cache.insert(key, query.clone());
        Ok(query)
    }

    /// The grammar backend's structural-query execution primitive (spec
    /// §4.5.3). Limits are soft: exceeding either flags the metric instead
    /// of raising, and whatever matched so far is still returned.
    pub fn run_query(
        &self,
        tree: &GrammarTree,
        query_source: &str,
        opts: QueryOptions,
    ) -> Result<(Vec<RawCapture>, QueryMetrics), String> {
        let query = self.compiled_query(query_source)?;
        let started = Instant::now();

        let mut cursor = QueryCursor::new();
        if let Some(limit) = opts.match_limit {
            cursor.set_match_limit(limit);
        }
        if let Some(timeout) = opts.timeout_micros {
            cursor.set_timeout_micros(timeout);
        }
        if let Some(range) = opts.byte_range {
            cursor.set_byte_range(range.start..range.end);
        }

        let mut captures = Vec::new();
        let mut matches = cursor.matches(&query, tree.tree.root_node(), tree.source.as_ref());
        let mut match_index = 0usize;
        while let Some(m) = matches.next() {
            for capture in m.captures.iter() {
                let name = query.capture_names()[capture.index as usize].to_string();
                let node = capture.node;
                captures.push(RawCapture {
                    match_index,
                    capture_name: name,
                    byte_range: ByteRange::new(node.start_byte(), node.end_byte()),
                    start_point: node.start_position().into(),
                    end_point: node.end_position().into(),
                });
            }
            match_index += 1;
        }

        let metrics = QueryMetrics {
            query_time_micros: started.elapsed().as_micros() as u64,
            node_count: tree.unified.node_count(),
            capture_count: captures.len(),
            exceeded_match_limit: cursor.did_exceed_match_limit(),
            exceeded_time_limit: false,
        };

        Ok((captures, metrics))
    }
}

impl Parser for GrammarParser {
    fn parse(&self, bytes: &[u8]) -> ParseResult {
        let mut parser = TsParser::new();
        if parser.set_language(&self.ts_language).is_err() {
            return ParseResult {
                tree: ParseTree::Custom(codelens_core::UnifiedNode::leaf(
                    "error",
                    codelens_core::Point::new(0, 0),
                    codelens_core::Point::new(0, 0),
                    ByteRange::new(0, 0),
                )),
                success: false,
                errors: vec![Diagnostic {
                    kind: DiagnosticKind::Error,
                    start: codelens_core::Point::new(0, 0),
                    end: codelens_core::Point::new(0, 0),
                    message: Some(format!("failed to load grammar for {}", self.language_id)),
                }],
            };
        }

        let Some(ts_tree) = parser.parse(bytes, None) else {
            return ParseResult {
                tree: ParseTree::Custom(codelens_core::UnifiedNode::leaf(
                    "error",
                    codelens_core::Point::new(0, 0),
                    codelens_core::Point::new(0, 0),
                    ByteRange::new(0, 0),
                )),
                success: false,
                errors: vec![Diagnostic {
                    kind: DiagnosticKind::Error,
                    start: codelens_core::Point::new(0, 0),
                    end: codelens_core::Point::new(0, 0),
                    message: Some("tree-sitter returned no tree".to_string()),
                }],
            };
        };

        let source: std::sync::Arc<[u8]> = bytes.to_vec().into();
        let unified = flatten_tree_sitter(ts_tree.root_node());
        let has_error = ts_tree.root_node().has_error();
        let errors = collect_error_diagnostics(&unified);

        ParseResult {
            tree: ParseTree::Grammar(GrammarTree {
                tree: ts_tree,
                source,
                unified,
                has_error,
            }),
            success: !has_error,
            errors,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn collect_error_diagnostics(node: &codelens_core::UnifiedNode) -> Vec<Diagnostic> {
    node.walk()
        .filter(|n| n.has_error)
        .map(|n| Diagnostic {
            kind: if n.error.is_some() {
                DiagnosticKind::Missing
            } else {
                DiagnosticKind::Error
            },
            start: n.start_point,
            end: n.end_point,
            message: n.error.clone(),
        })
        .collect()
}
