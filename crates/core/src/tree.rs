use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A `(row, col)` position, ordered lexicographically as the spec requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl From<tree_sitter::Point> for Point {
    fn from(p: tree_sitter::Point) -> Self {
        Self::new(p.row, p.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, other: &ByteRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A backend-agnostic view of one parse-tree node. Both the grammar backend
/// and handwritten backends build this same shape so the Pattern Engine's
/// regex/partial-match strategies and the extractors can walk either kind of
/// tree without caring which parser produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedNode {
    pub kind: String,
    pub start_point: Point,
    pub end_point: Point,
    pub byte_range: ByteRange,
    pub children: Vec<UnifiedNode>,
    pub is_named: bool,
    pub has_error: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl UnifiedNode {
    pub fn leaf(kind: impl Into<String>, start: Point, end: Point, range: ByteRange) -> Self {
        Self {
            kind: kind.into(),
            start_point: start,
            end_point: end,
            byte_range: range,
            children: Vec::new(),
            is_named: true,
            has_error: false,
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// Depth-first count of all nodes in this subtree, inclusive.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(UnifiedNode::node_count).sum::<usize>()
    }

    /// Maximum nesting depth of this subtree (a lone leaf has depth 1).
    pub fn max_depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(UnifiedNode::max_depth)
            .max()
            .unwrap_or(0)
    }

    /// Depth-first iterator over every node in the subtree, self first.
    pub fn walk(&self) -> impl Iterator<Item = &UnifiedNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            for child in node.children.iter().rev() {
                stack.push(child);
            }
            Some(node)
        })
    }

    pub fn text<'s>(&self, source: &'s [u8]) -> &'s str {
        std::str::from_utf8(&source[self.byte_range.start..self.byte_range.end]).unwrap_or("")
    }
}

/// Diagnostic raised during parsing; never fatal, always attached to the
/// `ParseResult` per the spec's error-handling design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub start: Point,
    pub end: Point,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    Error,
    Missing,
}

/// Grammar-backed tree: keeps the live `tree-sitter` tree and source around
/// so queries can still be executed against it, plus the unified owned view.
pub struct GrammarTree {
    pub tree: tree_sitter::Tree,
    pub source: Arc<[u8]>,
    pub unified: UnifiedNode,
    pub has_error: bool,
}

impl std::fmt::Debug for GrammarTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarTree")
            .field("has_error", &self.has_error)
            .field("unified", &self.unified)
            .finish()
    }
}

/// Handwritten-backend tree: just the recursive record.
pub type CustomTree = UnifiedNode;

/// Discriminated union of the two tree shapes the spec defines.
#[derive(Debug)]
pub enum ParseTree {
    Grammar(GrammarTree),
    Custom(CustomTree),
}

impl ParseTree {
    pub fn root(&self) -> &UnifiedNode {
        match self {
            ParseTree::Grammar(g) => &g.unified,
            ParseTree::Custom(c) => c,
        }
    }

    pub fn has_error(&self) -> bool {
        match self {
            ParseTree::Grammar(g) => g.has_error,
            ParseTree::Custom(c) => c.has_error,
        }
    }

    pub fn parser_kind(&self) -> crate::classification::ParserKind {
        match self {
            ParseTree::Grammar(_) => crate::classification::ParserKind::Grammar,
            ParseTree::Custom(_) => crate::classification::ParserKind::Handwritten,
        }
    }

    pub fn as_grammar(&self) -> Option<&GrammarTree> {
        match self {
            ParseTree::Grammar(g) => Some(g),
            ParseTree::Custom(_) => None,
        }
    }
}

/// Uniform output of both parser backend families (spec §4.4.3).
#[derive(Debug)]
pub struct ParseResult {
    pub tree: ParseTree,
    pub success: bool,
    pub errors: Vec<Diagnostic>,
}

/// Flattens a `tree-sitter` tree into an owned [`UnifiedNode`] tree once, at
/// parse time, so later consumers never need to touch `tree-sitter` directly.
/// Source bytes aren't stored on the node itself (`UnifiedNode::text` takes
/// the source as an argument) but `GrammarTree` keeps them alongside.
pub fn flatten_tree_sitter(node: tree_sitter::Node) -> UnifiedNode {
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).map(flatten_tree_sitter).collect();

    UnifiedNode {
        kind: node.kind().to_string(),
        start_point: node.start_position().into(),
        end_point: node.end_position().into(),
        byte_range: ByteRange::new(node.start_byte(), node.end_byte()),
        children,
        is_named: node.is_named(),
        has_error: node.is_error() || node.is_missing(),
        error: if node.is_missing() {
            Some(format!("missing {}", node.kind()))
        } else {
            None
        },
        metadata: HashMap::new(),
    }
}
