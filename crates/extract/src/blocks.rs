//! Block extractor (spec §4.6): `(language, source, tree) -> [Block]`.

use codelens_core::{Block, ParseTree, UnifiedNode};

use crate::tables::table_for;

/// Recursively collects block/container nodes from an already-parsed tree,
/// whichever backend produced it — the kind registry is the only thing that
/// differs between a Grammar tree and a handwritten one.
pub fn extract_blocks(language_id: &str, source: &[u8], tree: &ParseTree) -> Vec<Block> {
    let table = table_for(language_id);
    let mut blocks = Vec::new();
    collect(tree.root(), source, table.block_kinds, table.container_kinds, &mut blocks);
    blocks
}

fn collect(node: &UnifiedNode, source: &[u8], block_kinds: &[&str], container_kinds: &[&str], out: &mut Vec<Block>) {
    let kind = node.kind.as_str();
    if block_kinds.contains(&kind) || container_kinds.contains(&kind) {
        out.push(Block {
            content: node.text(source).to_string(),
            start_point: node.start_point,
            end_point: node.end_point,
            byte_range: node.byte_range,
            kind: kind.to_string(),
            metadata: node.metadata.clone(),
            confidence: 1.0,
        });
    }
    for child in &node.children {
        collect(child, source, block_kinds, container_kinds, out);
    }
}

/// Heuristic fallback for a regex-only match with no tree to walk: scans
/// forward from `start_byte` for a matching closing delimiter (brace-style
/// languages) or a dedent (indentation-style languages), at confidence 0.7
/// per spec §4.6.
pub fn approximate_block(source: &str, start_byte: usize, kind: &str) -> Option<Block> {
    let rest = source.get(start_byte..)?;
    let opening_brace = rest.find('{')?;
    let after_brace = start_byte + opening_brace + 1;

    let end_byte = find_matching_close(source, after_brace).unwrap_or_else(|| find_dedent_end(source, start_byte));

    let content = source.get(start_byte..end_byte)?.to_string();
    let start_point = point_at(source, start_byte);
    let end_point = point_at(source, end_byte);

    Some(Block {
        content,
        start_point,
        end_point,
        byte_range: codelens_core::ByteRange::new(start_byte, end_byte),
        kind: kind.to_string(),
        metadata: std::collections::HashMap::new(),
        confidence: 0.7,
    })
}

fn find_matching_close(source: &str, after_open_brace: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 1i32;
    for (offset, byte) in bytes.iter().enumerate().skip(after_open_brace) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Indentation-style fallback: the block ends at the first subsequent line
/// whose indentation is no deeper than the starting line's.
fn find_dedent_end(source: &str, start_byte: usize) -> usize {
    let start_line_indent = source[..start_byte]
        .rfind('\n')
        .map(|nl| &source[nl + 1..start_byte])
        .unwrap_or(&source[..start_byte])
        .chars()
        .take_while(|c| c.is_whitespace())
        .count();

    let mut offset = start_byte;
    let mut saw_indented_line = false;
    for line in source[start_byte..].lines() {
        let line_indent = line.chars().take_while(|c| c.is_whitespace()).count();
        let trimmed_is_empty = line.trim().is_empty();
        if !trimmed_is_empty {
            if line_indent <= start_line_indent && saw_indented_line {
                return offset;
            }
            if line_indent > start_line_indent {
                saw_indented_line = true;
            }
        }
        offset += line.len() + 1;
    }
    source.len().min(offset)
}

fn point_at(source: &str, byte_offset: usize) -> codelens_core::Point {
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
