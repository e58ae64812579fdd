use serde::{Deserialize, Serialize};

/// Coarse kind of a file, independent of its specific language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    Code,
    Doc,
    Config,
    Data,
    Binary,
    Unknown,
}

/// Which parser backend family services a language, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParserKind {
    Grammar,
    Handwritten,
    Unknown,
}

/// Capability descriptor for a canonical language id, as produced by the
/// Language Mapper's registry lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageCapability {
    pub has_grammar_backend: bool,
    pub has_handwritten_backend: bool,
    pub fallback_kind: Option<ParserKind>,
    pub file_type: FileType,
}

impl LanguageCapability {
    pub const fn unknown() -> Self {
        Self {
            has_grammar_backend: false,
            has_handwritten_backend: false,
            fallback_kind: None,
            file_type: FileType::Unknown,
        }
    }
}

/// The result of classifying a single file: a canonical language id plus
/// enough information for dispatch to pick a parser without re-deriving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileClassification {
    pub path: String,
    pub language_id: String,
    pub file_type: FileType,
    pub parser_kind: ParserKind,
    pub fallback_parser_kind: Option<ParserKind>,
    pub confidence: f32,
    pub is_binary: bool,
}

impl FileClassification {
    /// Invariant: `language_id == "unknown"` implies `parser_kind == Unknown`.
    pub fn is_consistent(&self) -> bool {
        if self.language_id == "unknown" {
            self.parser_kind == ParserKind::Unknown
        } else {
            true
        }
    }

    pub fn binary(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language_id: "binary".to_string(),
            file_type: FileType::Binary,
            parser_kind: ParserKind::Unknown,
            fallback_parser_kind: None,
            confidence: 1.0,
            is_binary: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(language_id: &str, parser_kind: ParserKind) -> FileClassification {
        FileClassification {
            path: "a".to_string(),
            language_id: language_id.to_string(),
            file_type: FileType::Code,
            parser_kind,
            fallback_parser_kind: None,
            confidence: 1.0,
            is_binary: false,
        }
    }

    #[test]
    fn unknown_language_requires_unknown_parser_kind() {
        assert!(classification("unknown", ParserKind::Unknown).is_consistent());
        assert!(!classification("unknown", ParserKind::Grammar).is_consistent());
        assert!(!classification("unknown", ParserKind::Handwritten).is_consistent());
    }

    #[test]
    fn known_language_allows_any_parser_kind() {
        assert!(classification("python", ParserKind::Grammar).is_consistent());
        assert!(classification("ini", ParserKind::Handwritten).is_consistent());
        assert!(classification("python", ParserKind::Unknown).is_consistent());
    }
}
