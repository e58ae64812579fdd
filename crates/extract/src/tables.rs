//! Per-language node-kind registries the extractors dispatch through,
//! mirroring the registry style `codelens-languages::tables` and
//! `codelens-parse::dispatch` use to keep language names out of the walking
//! logic itself (spec §9: "avoid hard-wiring language names throughout").

use std::collections::HashMap;

use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageFeatureTable {
    /// Node kinds that add a cyclomatic-complexity decision point.
    pub branching_kinds: &'static [&'static str],
    /// Node kinds the block extractor treats as a "block" (spec §4.6).
    pub block_kinds: &'static [&'static str],
    /// Node kinds the block extractor treats as a top-level "container".
    pub container_kinds: &'static [&'static str],
    pub comment_kinds: &'static [&'static str],
    /// Comment-text prefixes that mark a doc comment rather than a plain one.
    pub doc_comment_prefixes: &'static [&'static str],
    pub literal_kinds: &'static [&'static str],
    pub identifier_kinds: &'static [&'static str],
    pub function_kinds: &'static [&'static str],
    pub class_kinds: &'static [&'static str],
    pub module_kinds: &'static [&'static str],
    pub import_kinds: &'static [&'static str],
    pub reference_kinds: &'static [&'static str],
    pub type_kinds: &'static [&'static str],
}

pub static LANGUAGE_FEATURE_TABLES: Lazy<HashMap<&'static str, LanguageFeatureTable>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(
        "rust",
        LanguageFeatureTable {
            branching_kinds: &[
                "if_expression",
                "if_let_expression",
                "while_expression",
                "while_let_expression",
                "loop_expression",
                "for_expression",
                "match_arm",
            ],
            block_kinds: &["block"],
            container_kinds: &["source_file", "mod_item"],
            comment_kinds: &["line_comment", "block_comment"],
            doc_comment_prefixes: &["///", "//!", "/**", "/*!"],
            literal_kinds: &[
                "integer_literal",
                "float_literal",
                "string_literal",
                "char_literal",
                "boolean_literal",
            ],
            identifier_kinds: &["identifier", "type_identifier", "field_identifier"],
            function_kinds: &["function_item"],
            class_kinds: &["struct_item", "enum_item", "trait_item", "impl_item"],
            module_kinds: &["mod_item"],
            import_kinds: &["use_declaration"],
            reference_kinds: &["call_expression", "field_expression"],
            type_kinds: &["type_identifier", "primitive_type"],
        },
    );

    m.insert(
        "python",
        LanguageFeatureTable {
            branching_kinds: &[
                "if_statement",
                "elif_clause",
                "while_statement",
                "for_statement",
                "except_clause",
                "boolean_operator",
            ],
            block_kinds: &["block"],
            container_kinds: &["module"],
            comment_kinds: &["comment"],
            doc_comment_prefixes: &["\"\"\"", "'''"],
            literal_kinds: &["integer", "float", "string", "true", "false", "none"],
            identifier_kinds: &["identifier"],
            function_kinds: &["function_definition"],
            class_kinds: &["class_definition"],
            module_kinds: &[],
            import_kinds: &["import_statement", "import_from_statement"],
            reference_kinds: &["call"],
            type_kinds: &["type"],
        },
    );

    m.insert(
        "javascript",
        LanguageFeatureTable {
            branching_kinds: &[
                "if_statement",
                "while_statement",
                "for_statement",
                "for_in_statement",
                "switch_case",
                "catch_clause",
                "ternary_expression",
            ],
            block_kinds: &["statement_block"],
            container_kinds: &["program"],
            comment_kinds: &["comment"],
            doc_comment_prefixes: &["/**"],
            literal_kinds: &["number", "string", "template_string", "true", "false", "null"],
            identifier_kinds: &["identifier", "property_identifier", "shorthand_property_identifier"],
            function_kinds: &["function_declaration", "function_expression", "arrow_function", "method_definition"],
            class_kinds: &["class_declaration"],
            module_kinds: &[],
            import_kinds: &["import_statement"],
            reference_kinds: &["call_expression", "member_expression"],
            type_kinds: &[],
        },
    );

    m.insert(
        "json",
        LanguageFeatureTable {
            branching_kinds: &[],
            block_kinds: &["object", "array"],
            container_kinds: &["document"],
            comment_kinds: &[],
            doc_comment_prefixes: &[],
            literal_kinds: &["string", "number", "true", "false", "null"],
            identifier_kinds: &[],
            function_kinds: &[],
            class_kinds: &[],
            module_kinds: &[],
            import_kinds: &[],
            reference_kinds: &[],
            type_kinds: &[],
        },
    );

    m.insert(
        "c",
        LanguageFeatureTable {
            branching_kinds: &[
                "if_statement",
                "while_statement",
                "for_statement",
                "do_statement",
                "case_statement",
            ],
            block_kinds: &["compound_statement"],
            container_kinds: &["translation_unit"],
            comment_kinds: &["comment"],
            doc_comment_prefixes: &["/**"],
            literal_kinds: &["number_literal", "string_literal", "char_literal"],
            identifier_kinds: &["identifier", "field_identifier", "type_identifier"],
            function_kinds: &["function_definition"],
            class_kinds: &["struct_specifier", "union_specifier", "enum_specifier"],
            module_kinds: &[],
            import_kinds: &["preproc_include"],
            reference_kinds: &["call_expression"],
            type_kinds: &["primitive_type", "type_identifier", "sized_type_specifier"],
        },
    );

    m.insert(
        "ini",
        LanguageFeatureTable {
            branching_kinds: &[],
            block_kinds: &["section"],
            container_kinds: &["ini_file"],
            comment_kinds: &[],
            doc_comment_prefixes: &[],
            literal_kinds: &["property"],
            identifier_kinds: &[],
            function_kinds: &[],
            class_kinds: &[],
            module_kinds: &[],
            import_kinds: &[],
            reference_kinds: &[],
            type_kinds: &[],
        },
    );

    m.insert("plaintext", LanguageFeatureTable::default());

    m
});

pub fn table_for(language_id: &str) -> LanguageFeatureTable {
    LANGUAGE_FEATURE_TABLES.get(language_id).copied().unwrap_or_default()
}
