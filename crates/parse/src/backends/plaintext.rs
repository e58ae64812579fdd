//! Plaintext backend: the final rung of the fallback chain (spec §4.3) and
//! the handwritten parser registered for `"plaintext"`. Treats the whole
//! file as a single block.

use codelens_core::{ByteRange, ParseResult, ParseTree, Point, UnifiedNode};

use crate::Parser;

#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextParser;

impl Parser for PlaintextParser {
    fn parse(&self, bytes: &[u8]) -> ParseResult {
        let text = String::from_utf8_lossy(bytes);
        let lines: Vec<&str> = text.lines().collect();
        let last_line_len = lines.last().map(|l| l.len()).unwrap_or(0);
        let end_row = lines.len().saturating_sub(1);

        let root = UnifiedNode::leaf(
            "plaintext_file",
            Point::new(0, 0),
            Point::new(end_row, last_line_len),
            ByteRange::new(0, bytes.len()),
        );

        ParseResult {
            tree: ParseTree::Custom(root),
            success: true,
            errors: Vec::new(),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
