//! Parser Dispatch (spec §4.3): `get_parser(classification) -> Parser`,
//! backed by a parser pool keyed by language id and a fallback chain.

use std::sync::Arc;

use codelens_core::{DispatchError, DispatchResult, FileClassification, ParserKind};
use dashmap::DashMap;

use crate::backends::{GrammarParser, IniParser, PlaintextParser};
use crate::Parser;

type GrammarFactory = fn() -> tree_sitter::Language;

/// Registry of backend factories per canonical language id. Kept as small,
/// declarative data (spec §9: "Avoid hard-wiring language names throughout
/// the code"); only this table and the Language Mapper's own tables know
/// language names.
struct LanguageEntry {
    grammar: Option<GrammarFactory>,
    handwritten: Option<fn() -> Arc<dyn Parser>>,
}

fn registry() -> Vec<(&'static str, LanguageEntry)> {
    vec![
        (
            "rust",
            LanguageEntry {
                grammar: Some(|| tree_sitter_rust::LANGUAGE.into()),
                handwritten: None,
            },
        ),
        (
            "python",
            LanguageEntry {
                grammar: Some(|| tree_sitter_python::LANGUAGE.into()),
                handwritten: None,
            },
        ),
        (
            "javascript",
            LanguageEntry {
                grammar: Some(|| tree_sitter_javascript::LANGUAGE.into()),
                handwritten: None,
            },
        ),
        (
            "json",
            LanguageEntry {
                grammar: Some(|| tree_sitter_json::LANGUAGE.into()),
                handwritten: None,
            },
        ),
        (
            "c",
            LanguageEntry {
                grammar: Some(|| tree_sitter_c::LANGUAGE.into()),
                handwritten: None,
            },
        ),
        (
            "ini",
            LanguageEntry {
                grammar: None,
                handwritten: Some(|| Arc::new(IniParser::default())),
            },
        ),
        (
            "plaintext",
            LanguageEntry {
                grammar: None,
                handwritten: Some(|| Arc::new(PlaintextParser)),
            },
        ),
    ]
}

/// Parser pool + fallback chain. Shared across threads: `DashMap`'s
/// sharded locking gives per-entry creation exclusivity while steady-state
/// reads across different shards never block each other (spec §5).
pub struct ParserDispatch {
    registry: std::collections::HashMap<&'static str, LanguageEntry>,
    pool: DashMap<(String, ParserKind), Arc<dyn Parser>>,
}

impl Default for ParserDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserDispatch {
    pub fn new() -> Self {
        Self {
            registry: registry().into_iter().collect(),
            pool: DashMap::new(),
        }
    }

    pub fn has_handwritten(&self, language_id: &str) -> bool {
        self.registry
            .get(language_id)
            .is_some_and(|e| e.handwritten.is_some())
    }

    pub fn has_grammar(&self, language_id: &str) -> bool {
        self.registry
            .get(language_id)
            .is_some_and(|e| e.grammar.is_some())
    }

    pub fn list_supported_languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self.registry.keys().map(|s| s.to_string()).collect();
        langs.sort();
        langs
    }

    fn build(&self, language_id: &str, kind: ParserKind) -> Option<Arc<dyn Parser>> {
        let entry = self.registry.get(language_id)?;
        match kind {
            ParserKind::Grammar => entry.grammar.map(|factory| {
                Arc::new(GrammarParser::new(language_id, factory())) as Arc<dyn Parser>
            }),
            ParserKind::Handwritten => entry.handwritten.map(|factory| factory()),
            ParserKind::Unknown => None,
        }
    }

    fn get_or_build(&self, language_id: &str, kind: ParserKind) -> Option<Arc<dyn Parser>> {
        let key = (language_id.to_string(), kind);
        if let Some(existing) = self.pool.get(&key) {
            return Some(existing.clone());
        }
        let parser = self.build(language_id, kind)?;
        self.pool.insert(key, parser.clone());
        Some(parser)
    }

    /// The pooled grammar parser for a language, if it has one. Lets callers
    /// that need the concrete backend (the Pattern Engine's structural query
    /// execution) reach past the `dyn Parser` trait object.
    pub fn grammar_parser(&self, language_id: &str) -> Option<Arc<dyn Parser>> {
        self.get_or_build(language_id, ParserKind::Grammar)
    }

    /// Resolves a classification to a concrete parser, walking the fallback
    /// chain `parser_kind -> fallback_parser_kind -> plaintext` (spec §4.3).
    pub fn get_parser(&self, classification: &FileClassification) -> DispatchResult<Arc<dyn Parser>> {
        if classification.parser_kind != ParserKind::Unknown {
            if let Some(parser) = self.get_or_build(&classification.language_id, classification.parser_kind) {
                return Ok(parser);
            }
            tracing::warn!(
                language_id = %classification.language_id,
                "primary parser kind unavailable, trying fallback"
            );
        }

        if let Some(fallback_kind) = classification.fallback_parser_kind {
            if let Some(parser) = self.get_or_build(&classification.language_id, fallback_kind) {
                return Ok(parser);
            }
        }

        if let Some(parser) = self.get_or_build("plaintext", ParserKind::Handwritten) {
            return Ok(parser);
        }

        Err(DispatchError::UnsupportedLanguage(classification.language_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_core::{FileType, ParserKind};

    fn classification(language_id: &str, kind: ParserKind) -> FileClassification {
        FileClassification {
            path: format!("f.{language_id}"),
            language_id: language_id.to_string(),
            file_type: FileType::Code,
            parser_kind: kind,
            fallback_parser_kind: None,
            confidence: 1.0,
            is_binary: false,
        }
    }

    #[test]
    fn builds_and_reuses_grammar_parser() {
        let dispatch = ParserDispatch::new();
        let c1 = classification("python", ParserKind::Grammar);
        let p1 = dispatch.get_parser(&c1).unwrap();
        let p2 = dispatch.get_parser(&c1).unwrap();
        assert!(Arc::ptr_eq(&p1, &p2), "parser pool should reuse the same instance");
    }

    #[test]
    fn falls_back_to_plaintext_for_unregistered_language() {
        let dispatch = ParserDispatch::new();
        let c = classification("cobol", ParserKind::Unknown);
        let parser = dispatch.get_parser(&c).unwrap();
        let result = parser.parse(b"HELLO\n");
        assert!(result.success);
    }

    #[test]
    fn lists_supported_languages() {
        let dispatch = ParserDispatch::new();
        let langs = dispatch.list_supported_languages();
        assert!(langs.contains(&"python".to_string()));
        assert!(langs.contains(&"ini".to_string()));
    }
}
