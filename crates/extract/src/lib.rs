//! Feature & Block Extractors (spec §4.6).

mod blocks;
mod features;
mod tables;

pub use blocks::{approximate_block, extract_blocks};
pub use features::extract_features;
pub use tables::{table_for, LanguageFeatureTable};

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_parse::backends::{GrammarParser, IniParser};
    use codelens_parse::Parser;

    #[test]
    fn extracts_python_function_and_complexity() {
        let parser = GrammarParser::new("python", tree_sitter_python::LANGUAGE.into());
        let source = "def greet(name):\n    if name:\n        return name\n    return None\n";
        let parsed = parser.parse(source.as_bytes());
        assert!(parsed.success);

        let features = extract_features("python", &parsed.tree, source.as_bytes(), None);
        assert!(features.structure.functions.iter().any(|f| f == "greet"));
        assert!(features.metrics.cyclomatic >= 2, "one if should add a decision point");
        assert!(features.diagnostics.is_empty());
    }

    #[test]
    fn extracts_ini_sections_as_blocks() {
        let parser = IniParser::default();
        let source = "[db]\nhost=localhost\n";
        let parsed = parser.parse(source.as_bytes());

        let blocks = extract_blocks("ini", source.as_bytes(), &parsed.tree);
        assert_eq!(blocks.len(), 2, "the ini_file container and the db section");
        assert!(blocks.iter().any(|b| b.kind == "section"));
    }

    #[test]
    fn approximate_block_scans_to_matching_brace() {
        let source = "if (x) {\n    do_thing();\n}\nafter();\n";
        let block = approximate_block(source, 0, "if_statement").expect("should find a brace block");
        assert!(block.content.contains("do_thing();"));
        assert!((block.confidence - 0.7).abs() < f32::EPSILON);
    }
}
