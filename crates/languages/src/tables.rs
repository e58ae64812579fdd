//! Extension, alias, and special-filename tables.
//!
//! Kept as plain data (spec §4.1: "tables are data, not code") so a
//! configuration reload could swap them without touching `detect`.

use std::collections::HashMap;

use codelens_core::{FileType, LanguageCapability, ParserKind};
use once_cell::sync::Lazy;

/// Exact basename matches, consulted before any extension lookup.
pub static SPECIAL_FILENAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("CMakeLists.txt", "cmake"),
        ("Dockerfile", "dockerfile"),
        ("BUILD", "starlark"),
        ("BUILD.bazel", "starlark"),
        ("WORKSPACE", "starlark"),
        ("WORKSPACE.bazel", "starlark"),
        ("requirements.txt", "requirements"),
        (".gitignore", "gitignore"),
        (".editorconfig", "editorconfig"),
        (".env", "env"),
        ("Cargo.toml", "toml"),
        ("Makefile", "make"),
    ])
});

/// Extension (without leading dot, already lower-cased) -> canonical language id.
/// Aliases collapse into the same canonical id as their primary spelling.
pub static EXTENSION_TO_LANGUAGE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Systems
        ("c", "c"),
        ("h", "c"),
        ("cpp", "cpp"),
        ("hpp", "cpp"),
        ("cc", "cpp"),
        ("cxx", "cpp"),
        ("rs", "rust"),
        ("go", "go"),
        // Scripting
        ("py", "python"),
        ("pyi", "python"),
        ("rb", "ruby"),
        ("rake", "ruby"),
        ("gemspec", "ruby"),
        ("php", "php"),
        ("lua", "lua"),
        ("pl", "perl"),
        ("pm", "perl"),
        // Shell
        ("sh", "bash"),
        ("bash", "bash"),
        ("zsh", "bash"),
        // Web
        ("js", "javascript"),
        ("mjs", "javascript"),
        ("cjs", "javascript"),
        ("jsx", "javascript"),
        ("ts", "typescript"),
        ("tsx", "typescript"),
        ("html", "html"),
        ("htm", "html"),
        ("xhtml", "html"),
        ("css", "css"),
        // JVM
        ("java", "java"),
        ("kt", "kotlin"),
        ("kts", "kotlin"),
        ("scala", "scala"),
        ("gradle", "groovy"),
        ("groovy", "groovy"),
        // Config/data
        ("yaml", "yaml"),
        ("yml", "yaml"),
        ("json", "json"),
        ("jsonc", "json"),
        ("toml", "toml"),
        ("xml", "xml"),
        ("xsd", "xml"),
        ("svg", "xml"),
        ("ini", "ini"),
        ("cfg", "ini"),
        ("conf", "ini"),
        ("properties", "ini"),
        // Docs
        ("md", "markdown"),
        ("markdown", "markdown"),
        ("rst", "rst"),
        ("rest", "rst"),
        ("adoc", "asciidoc"),
        ("asciidoc", "asciidoc"),
        ("tex", "latex"),
        // Build
        ("cmake", "cmake"),
        ("make", "make"),
        ("mk", "make"),
    ])
});

/// Per-canonical-language capability descriptors: which backend family is
/// available, and what kind of file the language represents. This is the
/// registry the Classifier (spec §4.2) consults.
pub static LANGUAGE_CAPABILITIES: Lazy<HashMap<&'static str, LanguageCapability>> =
    Lazy::new(|| {
        let code = |grammar: bool, handwritten: bool| LanguageCapability {
            has_grammar_backend: grammar,
            has_handwritten_backend: handwritten,
            fallback_kind: match (grammar, handwritten) {
                (true, true) => Some(ParserKind::Grammar),
                (true, false) => None,
                (false, true) => None,
                (false, false) => None,
            },
            file_type: FileType::Code,
        };
        let config = |handwritten: bool| LanguageCapability {
            has_grammar_backend: false,
            has_handwritten_backend: handwritten,
            fallback_kind: None,
            file_type: FileType::Config,
        };

        HashMap::from([
            ("rust", code(true, false)),
            ("python", code(true, false)),
            ("javascript", code(true, false)),
            ("typescript", code(true, false)),
            ("json", code(true, false)),
            ("c", code(true, false)),
            ("cpp", code(true, false)),
            ("go", code(false, false)),
            ("ini", config(true)),
            ("toml", config(false)),
            ("yaml", config(false)),
            ("xml", config(false)),
            (
                "markdown",
                LanguageCapability {
                    has_grammar_backend: false,
                    has_handwritten_backend: false,
                    fallback_kind: None,
                    file_type: FileType::Doc,
                },
            ),
            ("dockerfile", config(false)),
            ("cmake", config(false)),
            ("make", config(false)),
            ("requirements", config(false)),
            ("gitignore", config(false)),
            ("editorconfig", config(false)),
            ("env", config(false)),
            (
                "plaintext",
                LanguageCapability {
                    has_grammar_backend: false,
                    has_handwritten_backend: true,
                    fallback_kind: None,
                    file_type: FileType::Unknown,
                },
            ),
        ])
    });

pub fn capability_for(language_id: &str) -> LanguageCapability {
    LANGUAGE_CAPABILITIES
        .get(language_id)
        .cloned()
        .unwrap_or_else(LanguageCapability::unknown)
}
