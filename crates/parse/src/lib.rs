//! Classifier, Parser Dispatch, and Parser Backends (spec §4.2–4.4).

pub mod backends;
mod classifier;
mod dispatch;

pub use classifier::{sniff_binary, Classifier};
pub use codelens_core::ParseResult;
pub use dispatch::ParserDispatch;

/// The uniform capability both parser backend families implement (spec §4.3).
pub trait Parser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> ParseResult;

    /// Most parsers are stateless after construction; override when a
    /// backend holds resources (file handles, native allocations) that
    /// need explicit teardown.
    fn cleanup(&self) {}

    /// Lets callers that need a concrete backend (the Pattern Engine's
    /// grammar query execution) downcast from the pooled trait object.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Convenience façade combining the Classifier and Parser Dispatch, mirroring
/// how callers actually use this layer: classify, then immediately dispatch.
pub struct ClassifyingDispatch {
    pub classifier: Classifier,
    pub dispatch: ParserDispatch,
}

impl Default for ClassifyingDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifyingDispatch {
    pub fn new() -> Self {
        Self {
            classifier: Classifier::default(),
            dispatch: ParserDispatch::new(),
        }
    }

    /// Builds a façade whose binary sniff uses the given window/threshold
    /// instead of the classifier's defaults — how the `Engine` threads
    /// `EngineConfig` through to the classifier it builds.
    pub fn with_binary_sniff(binary_sniff_window: usize, binary_sniff_threshold: f32) -> Self {
        Self {
            classifier: Classifier::new(binary_sniff_window, binary_sniff_threshold),
            dispatch: ParserDispatch::new(),
        }
    }

    pub fn classify_and_parse(&self, path: &str, bytes: &[u8]) -> codelens_core::ParseResult {
        let classification = self
            .classifier
            .classify(path, bytes, |lang| self.dispatch.has_handwritten(lang));
        match self.dispatch.get_parser(&classification) {
            Ok(parser) => parser.parse(bytes),
            Err(_) => backends::PlaintextParser.parse(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_classify_and_parse_python() {
        let facade = ClassifyingDispatch::new();
        let result = facade.classify_and_parse("a.py", b"def hello(x, y):\n    return x + y\n");
        assert!(result.success);
        assert_eq!(result.tree.parser_kind(), codelens_core::ParserKind::Grammar);
    }

    #[test]
    fn malformed_c_still_parses_with_diagnostics() {
        let facade = ClassifyingDispatch::new();
        let source = b"int main() { int x = ; }";
        let result = facade.classify_and_parse("a.c", source);
        assert!(!result.success);
        assert!(!result.errors.is_empty());
        let needle = "= ;";
        let needle_start = std::str::from_utf8(source).unwrap().find(needle).unwrap();
        let needle_end = needle_start + needle.len();
        assert!(result
            .errors
            .iter()
            .any(|e| e.start.row == 0 && e.start.column <= needle_end && e.end.column >= needle_start));
    }
}
