//! The Classifier (spec §4.2): `(path, content?) -> FileClassification`.

use codelens_core::{FileClassification, FileType, ParserKind};
use codelens_languages::LanguageMapper;

/// Bytes considered printable ASCII/UTF-8-continuation for the binary sniff.
fn is_text_byte(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x0A | 0x0D | 0x20..=0x7E | 0xC0..=0xFD)
}

/// Cheap binary sniff (spec §4.2 step 1): NUL byte, or >30% non-text bytes
/// in the first 1 KiB, marks the file binary.
pub fn sniff_binary(bytes: &[u8], window: usize, threshold: f32) -> bool {
    let sample = &bytes[..bytes.len().min(window)];
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0u8) {
        return true;
    }
    let non_text = sample.iter().filter(|b| !is_text_byte(**b)).count();
    (non_text as f32 / sample.len() as f32) > threshold
}

pub struct Classifier {
    mapper: LanguageMapper,
    binary_sniff_window: usize,
    binary_sniff_threshold: f32,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(1024, 0.30)
    }
}

impl Classifier {
    pub fn new(binary_sniff_window: usize, binary_sniff_threshold: f32) -> Self {
        Self {
            mapper: LanguageMapper::new(),
            binary_sniff_window,
            binary_sniff_threshold,
        }
    }

    /// Classify a file given its path, raw bytes, and a registry of
    /// handwritten-backend language ids (handwritten wins over grammar when
    /// both exist, per spec §4.2 step 3).
    pub fn classify(
        &self,
        path: &str,
        bytes: &[u8],
        handwritten_registered: impl Fn(&str) -> bool,
    ) -> FileClassification {
        if sniff_binary(bytes, self.binary_sniff_window, self.binary_sniff_threshold) {
            tracing::debug!(path, "classified as binary via byte sniff");
            return FileClassification::binary(path);
        }

        let content = std::str::from_utf8(bytes).ok();
        let (language_id, confidence, capability) = self.mapper.map(path, content);

        let (parser_kind, fallback_parser_kind) = if language_id == "plaintext" {
            (ParserKind::Handwritten, None)
        } else if handwritten_registered(&language_id) {
            let fallback = if capability.has_grammar_backend {
                Some(ParserKind::Grammar)
            } else {
                None
            };
            (ParserKind::Handwritten, fallback)
        } else if capability.has_grammar_backend {
            (ParserKind::Grammar, None)
        } else {
            (ParserKind::Unknown, None)
        };

        let file_type = if language_id == "unknown" || parser_kind == ParserKind::Unknown {
            FileType::Unknown
        } else {
            capability.file_type
        };

        let classification = FileClassification {
            path: path.to_string(),
            language_id: if parser_kind == ParserKind::Unknown && capability.file_type == FileType::Unknown {
                "unknown".to_string()
            } else {
                language_id
            },
            file_type,
            parser_kind,
            fallback_parser_kind,
            confidence,
            is_binary: false,
        };

        debug_assert!(classification.is_consistent());
        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_python_function() {
        let classifier = Classifier::default();
        let source = b"def hello(x, y):\n    return x + y\n";
        let classification = classifier.classify("a.py", source, |_| false);
        assert_eq!(classification.language_id, "python");
        assert_eq!(classification.file_type, FileType::Code);
        assert_eq!(classification.parser_kind, ParserKind::Grammar);
        assert!(classification.confidence >= 0.95);
        assert!(!classification.is_binary);
    }

    #[test]
    fn classifies_binary_via_nul_byte() {
        let classifier = Classifier::default();
        let bytes = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let classification = classifier.classify("blob.bin", &bytes, |_| false);
        assert!(classification.is_binary);
        assert_eq!(classification.file_type, FileType::Binary);
    }

    #[test]
    fn prefers_handwritten_over_grammar() {
        let classifier = Classifier::default();
        let classification = classifier.classify("f.ini", b"[x]\n", |lang| lang == "ini");
        assert_eq!(classification.parser_kind, ParserKind::Handwritten);
    }

    #[test]
    fn deterministic_given_fixed_registry() {
        let classifier = Classifier::default();
        let first = classifier.classify("a.py", b"x = 1\n", |_| false);
        let second = classifier.classify("a.py", b"x = 1\n", |_| false);
        assert_eq!(first.language_id, second.language_id);
        assert_eq!(first.parser_kind, second.parser_kind);
    }
}
