//! Adaptive pattern rewrite rules (spec §4.5.4). Rewrites are conservative,
//! single-shot, and reverted by the caller if they fail to compile.

use codelens_core::{ParseTree, Pattern};

/// AST node-count above which optional quantifiers get promoted to
/// required, on the theory that a sufficiently dense tree means the
/// optional subpattern is empirically always present.
const DENSITY_THRESHOLD: usize = 500;

/// Computes a candidate rewrite of `pattern` given the tree it's about to
/// run against and the raw source (used to detect indent style for regex
/// retuning). Returns `None` when no rule applies. The caller is
/// responsible for validating the candidate compiles before using it.
pub fn adapt_pattern(pattern: &Pattern, tree: &ParseTree, source: &str) -> Option<Pattern> {
    let mut adapted = pattern.clone();
    let mut changed = false;

    if let Some(query) = &pattern.query {
        if tree.root().node_count() > DENSITY_THRESHOLD {
            if let Some(promoted) = promote_optional_quantifiers(query) {
                adapted.query = Some(promoted);
                changed = true;
            }
        }
    }

    if let Some(regex_source) = &pattern.regex {
        if let Some(retuned) = retune_whitespace(regex_source, source) {
            adapted.regex = Some(retuned);
            changed = true;
        }
    }

    if changed {
        adapted.metadata.adapted = true;
        Some(adapted)
    } else {
        None
    }
}

/// Promotes `(...)?` node groups to required by dropping the trailing `?`.
/// Returns `None` when the query has no optional groups to promote.
fn promote_optional_quantifiers(query: &str) -> Option<String> {
    if !query.contains(")?") {
        return None;
    }
    Some(query.replace(")?", ")"))
}

/// Retunes a `\s+` whitespace class to the code's detected indent style:
/// tabs, a fixed space width, or a tabs-or-spaces class as a safe default.
fn retune_whitespace(regex_source: &str, source: &str) -> Option<String> {
    if !regex_source.contains(r"\s+") {
        return None;
    }
    let replacement = detect_indent_class(source);
    Some(regex_source.replace(r"\s+", &replacement))
}

fn detect_indent_class(source: &str) -> String {
    let mut tab_lines = 0usize;
    let mut space_widths: Vec<usize> = Vec::new();

    for line in source.lines() {
        if let Some(rest) = line.strip_prefix('\t') {
            if !rest.is_empty() {
                tab_lines += 1;
            }
        } else {
            let width = line.chars().take_while(|c| *c == ' ').count();
            if width > 0 && width < line.len() {
                space_widths.push(width);
            }
        }
    }

    if tab_lines > space_widths.len() {
        return r"\t+".to_string();
    }

    if let Some(&common) = space_widths.first() {
        if common > 0 && space_widths.iter().all(|w| w % common == 0) {
            return format!(" {{{common}}}");
        }
    }

    r"[ \t]+".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotes_optional_groups_when_present() {
        assert_eq!(
            promote_optional_quantifiers("(block (statement)? @s)"),
            Some("(block (statement) @s)".to_string())
        );
        assert_eq!(promote_optional_quantifiers("(block (statement) @s)"), None);
    }

    #[test]
    fn detects_fixed_space_indent() {
        let source = "fn x() {\n    let a = 1;\n    let b = 2;\n}\n";
        assert_eq!(detect_indent_class(source), " {4}");
    }

    #[test]
    fn detects_tabs() {
        let source = "fn x() {\n\tlet a = 1;\n\tlet b = 2;\n}\n";
        assert_eq!(detect_indent_class(source), r"\t+");
    }
}
