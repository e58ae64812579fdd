//! Handwritten INI/properties backend (spec §4.4.2), grounded in the
//! reference implementation's `custom_ini_parser`: a line-oriented scanner
//! producing `comment`, `section`, and `property` nodes as real tree nodes,
//! each with its own `start_point`/`end_point`/`byte_range`, so the parse
//! tree reproduces the original line structure.

use codelens_core::{ByteRange, ParseResult, ParseTree, Point, UnifiedNode};
use regex::Regex;

use crate::Parser;

pub struct IniParser {
    comment_re: Regex,
    section_re: Regex,
    property_re: Regex,
}

impl Default for IniParser {
    fn default() -> Self {
        Self {
            comment_re: Regex::new(r"^[;#](?P<text>.*)$").unwrap(),
            section_re: Regex::new(r"^\[(?P<name>[^\]]+)\]$").unwrap(),
            property_re: Regex::new(r"^(?P<key>[^=:\s][^=:]*?)\s*[:=]\s*(?P<value>.*)$").unwrap(),
        }
    }
}

impl Parser for IniParser {
    fn parse(&self, bytes: &[u8]) -> ParseResult {
        let source = String::from_utf8_lossy(bytes).into_owned();
        let lines: Vec<&str> = source.lines().collect();

        let mut root_children: Vec<UnifiedNode> = Vec::new();
        let mut current_section: Option<usize> = None; // index into root_children
        let mut offset = 0usize;

        for (row, raw_line) in lines.iter().enumerate() {
            let line_start_offset = offset;
            offset += raw_line.len() + 1; // + newline
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let start = Point::new(row, 0);
            let end = Point::new(row, raw_line.len());
            let range = ByteRange::new(line_start_offset, line_start_offset + raw_line.len());

            if let Some(caps) = self.comment_re.captures(trimmed) {
                let text = caps.name("text").map(|m| m.as_str().trim().to_string()).unwrap_or_default();
                let mut node = UnifiedNode::leaf("comment", start, end, range);
                node.metadata.insert("text".to_string(), text);
                push(&mut root_children, current_section, node);
                continue;
            }

            if let Some(caps) = self.section_re.captures(trimmed) {
                let name = caps.name("name").map(|m| m.as_str().to_string()).unwrap_or_default();
                let mut node = UnifiedNode::leaf("section", start, end, range);
                node.metadata.insert("name".to_string(), name);
                root_children.push(node);
                current_section = Some(root_children.len() - 1);
                continue;
            }

            if let Some(caps) = self.property_re.captures(trimmed) {
                let key = caps.name("key").map(|m| m.as_str().to_string()).unwrap_or_default();
                let value = caps.name("value").map(|m| m.as_str().to_string()).unwrap_or_default();
                let mut node = UnifiedNode::leaf("property", start, end, range);
                node.metadata.insert("key".to_string(), key.clone());
                node.metadata.insert("value".to_string(), value.clone());
                if looks_like_path(&value) {
                    node.metadata.insert("semantic".to_string(), "path".to_string());
                } else if key.to_uppercase() == key && key.contains('_') {
                    node.metadata.insert("semantic".to_string(), "environment".to_string());
                }
                push(&mut root_children, current_section, node);
                continue;
            }

            // Unrecognized non-empty line: attach an error to a synthetic node
            // but keep going, per spec §4.4.2 "must never panic ... continue".
            let mut node = UnifiedNode::leaf("unrecognized", start, end, range);
            node.has_error = true;
            node.error = Some(format!("unrecognized INI line: {trimmed:?}"));
            push(&mut root_children, current_section, node);
        }

        let last_line_len = lines.last().map(|l| l.len()).unwrap_or(0);
        let mut root = UnifiedNode::leaf(
            "ini_file",
            Point::new(0, 0),
            Point::new(lines.len().saturating_sub(1), last_line_len),
            ByteRange::new(0, bytes.len()),
        );
        root.children = root_children;

        let has_error = root.walk().any(|n| n.has_error);
        ParseResult {
            tree: ParseTree::Custom(root),
            success: !has_error,
            errors: Vec::new(),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Appends `node` as a child of the current section, or as a root-level
/// child when no section has been opened yet — keeping the tree's line
/// order intact for a faithful round-trip.
fn push(root_children: &mut Vec<UnifiedNode>, current_section: Option<usize>, node: UnifiedNode) {
    match current_section {
        Some(idx) => root_children[idx].children.push(node),
        None => root_children.push(node),
    }
}

fn looks_like_path(value: &str) -> bool {
    value.contains('/') || value.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_section_and_properties_with_comment() {
        let parser = IniParser::default();
        let source = "; top comment\n[db]\nhost=localhost\nport=5432\n";
        let result = parser.parse(source.as_bytes());
        assert!(result.success);
        let root = result.tree.root();
        assert_eq!(root.children.len(), 2, "a root-level comment, then the section");

        let comment = &root.children[0];
        assert_eq!(comment.kind, "comment");
        assert_eq!(comment.start_point, Point::new(0, 0));
        assert_eq!(comment.metadata.get("text").map(String::as_str), Some("top comment"));
        assert_eq!(comment.text(source.as_bytes()), "; top comment");

        let section = &root.children[1];
        assert_eq!(section.kind, "section");
        assert_eq!(section.children.len(), 2);
        assert_eq!(section.children[0].kind, "property");
        assert_eq!(section.children[0].metadata.get("key").map(String::as_str), Some("host"));
        assert_eq!(section.children[1].metadata.get("key").map(String::as_str), Some("port"));
    }
}
