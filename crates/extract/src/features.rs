//! Feature extractor (spec §4.6): walks a parse tree once into the four
//! feature buckets, merges supplied pattern matches, and computes complexity
//! metrics directly from the same walk. Never throws.

use std::collections::HashSet;

use codelens_core::{ComplexityMetrics, ExtractedFeatures, ParseTree, PatternMatch, UnifiedNode};

use crate::tables::{table_for, LanguageFeatureTable};

/// `(parse_tree, source, optional patterns) -> ExtractedFeatures` (spec §4.6).
/// Never panics outward: an internal failure during the walk is caught and
/// turned into a partially populated result with a `diagnostics` entry.
pub fn extract_features(language_id: &str, tree: &ParseTree, source: &[u8], pattern_matches: Option<&[PatternMatch]>) -> ExtractedFeatures {
    let table = table_for(language_id);
    let root = tree.root();

    let walked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| walk(root, source, &table)));

    let mut features = match walked {
        Ok(features) => features,
        Err(_) => {
            let mut features = ExtractedFeatures::default();
            features.diagnostics.push("internal failure during feature extraction walk".to_string());
            return features;
        }
    };

    if let Some(matches) = pattern_matches {
        merge_pattern_matches(&mut features, matches);
    }

    features.metrics = compute_metrics(root, &features);
    features
}

fn walk(root: &UnifiedNode, source: &[u8], table: &LanguageFeatureTable) -> ExtractedFeatures {
    let mut features = ExtractedFeatures::default();
    let mut branching_count = 0u32;
    let mut cognitive = 0u32;
    let mut operator_kinds: HashSet<String> = HashSet::new();
    let mut operand_kinds: HashSet<String> = HashSet::new();
    let mut operator_count = 0u32;
    let mut operand_count = 0u32;

    visit(root, source, table, 0, &mut features, &mut |kind, is_named, nesting| {
        if table.branching_kinds.contains(&kind) {
            branching_count += 1;
            cognitive += 1 + nesting as u32;
        }
        if !is_named && is_operator_token(kind) {
            operator_kinds.insert(kind.to_string());
            operator_count += 1;
        }
        if table.literal_kinds.contains(&kind) || table.identifier_kinds.contains(&kind) {
            operand_kinds.insert(kind.to_string());
            operand_count += 1;
        }
    });

    features.metrics.cyclomatic = 1 + branching_count;
    features.metrics.cognitive = cognitive;
    features.metrics.halstead_distinct_operators = operator_kinds.len() as u32;
    features.metrics.halstead_distinct_operands = operand_kinds.len() as u32;
    let total_operators = operator_count.max(1) as f64;
    let total_operands = operand_count.max(1) as f64;
    let distinct_operators = (operator_kinds.len().max(1)) as f64;
    let distinct_operands = (operand_kinds.len().max(1)) as f64;
    let vocabulary = distinct_operators + distinct_operands;
    let length = total_operators + total_operands;
    features.metrics.halstead_volume = length * vocabulary.log2().max(1.0);

    features
}

/// Depth-first walk, bucketing every node and invoking `on_node` for the
/// complexity accumulators that need structural context (node kind, whether
/// it's a named node, current nesting depth).
fn visit(
    node: &UnifiedNode,
    source: &[u8],
    table: &LanguageFeatureTable,
    nesting: usize,
    features: &mut ExtractedFeatures,
    on_node: &mut impl FnMut(&str, bool, usize),
) {
    let kind = node.kind.as_str();
    on_node(kind, node.is_named, nesting);

    categorize(node, source, table, features);

    let child_nesting = if table.block_kinds.contains(&kind) { nesting + 1 } else { nesting };
    for child in &node.children {
        visit(child, source, table, child_nesting, features, on_node);
    }
}

fn categorize(node: &UnifiedNode, source: &[u8], table: &LanguageFeatureTable, features: &mut ExtractedFeatures) {
    let kind = node.kind.as_str();
    let text = || node.text(source).to_string();

    if table.literal_kinds.contains(&kind) {
        features.syntax.literals.push(text());
    }
    if table.identifier_kinds.contains(&kind) {
        features.syntax.identifiers.push(text());
    }
    if !node.is_named && is_operator_token(kind) {
        features.syntax.operators.push(kind.to_string());
    }
    if !node.is_named && is_keyword_token(kind) {
        features.syntax.keywords.push(kind.to_string());
    }

    if table.function_kinds.contains(&kind) {
        features.structure.functions.push(function_name(node, source).unwrap_or_else(text));
    }
    if table.class_kinds.contains(&kind) {
        features.structure.classes.push(function_name(node, source).unwrap_or_else(text));
    }
    if table.module_kinds.contains(&kind) {
        features.structure.modules.push(function_name(node, source).unwrap_or_else(text));
    }
    if table.block_kinds.contains(&kind) {
        features.structure.blocks += 1;
    }

    if table.import_kinds.contains(&kind) {
        features.semantics.imports.push(text());
    }
    if table.reference_kinds.contains(&kind) {
        features.semantics.references.push(text());
    }
    if table.type_kinds.contains(&kind) {
        features.semantics.types.push(text());
    }

    if table.comment_kinds.contains(&kind) {
        let comment_text = text();
        if table.doc_comment_prefixes.iter().any(|p| comment_text.trim_start().starts_with(p)) {
            features.documentation.doc_comments.push(comment_text);
        } else {
            features.documentation.comments.push(comment_text);
        }
    }
}

/// A function/class/module node's name child is usually a `name:` field
/// in the grammar; since `UnifiedNode` doesn't preserve field names, fall
/// back to the first identifier-shaped child's text.
fn function_name(node: &UnifiedNode, source: &[u8]) -> Option<String> {
    node.children
        .iter()
        .find(|c| c.kind == "identifier" || c.kind == "type_identifier" || c.kind == "property_identifier")
        .map(|c| c.text(source).to_string())
}

fn is_operator_token(kind: &str) -> bool {
    const OPERATORS: &[&str] = &[
        "+", "-", "*", "/", "%", "==", "!=", "<", ">", "<=", ">=", "&&", "||", "!", "=", "+=", "-=", "*=", "/=", "&",
        "|", "^", "<<", ">>", "->", "=>", "::", "...", "??",
    ];
    OPERATORS.contains(&kind)
}

fn is_keyword_token(kind: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "if", "else", "elif", "while", "for", "loop", "match", "case", "switch", "fn", "def", "function", "class",
        "struct", "enum", "impl", "trait", "return", "break", "continue", "let", "var", "const", "import", "from",
        "use", "pub", "async", "await", "try", "except", "catch", "finally", "new", "this", "self",
    ];
    KEYWORDS.contains(&kind)
}

fn merge_pattern_matches(features: &mut ExtractedFeatures, matches: &[PatternMatch]) {
    for m in matches {
        for captures in m.captures.values() {
            for capture in captures {
                features.semantics.references.push(capture.text.clone());
            }
        }
    }
}

fn compute_metrics(root: &UnifiedNode, features: &ExtractedFeatures) -> ComplexityMetrics {
    let mut metrics = features.metrics.clone();
    metrics.node_count = root.node_count();
    metrics.max_depth = root.max_depth();
    // Maintainability index, Microsoft-variant formula scaled to 0-100.
    let volume = metrics.halstead_volume.max(1.0);
    let cyclomatic = metrics.cyclomatic as f64;
    let loc = (metrics.node_count as f64).max(1.0);
    let raw = 171.0 - 5.2 * volume.ln() - 0.23 * cyclomatic - 16.2 * loc.ln();
    metrics.maintainability_index = (raw * 100.0 / 171.0).clamp(0.0, 100.0);
    metrics
}
