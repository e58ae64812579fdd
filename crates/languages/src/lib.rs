//! Language Mapper (spec §4.1): canonical language ids, extension/alias
//! tables, content sniffers, and capability descriptors.

mod detect;
mod tables;

pub use codelens_core::LanguageCapability;
pub use detect::detect_language;
pub use tables::capability_for;

use std::path::Path;

/// The Language Mapper's full contract: path/content in, language id plus
/// capability descriptor out. Does not fail (spec §4.1 "Error policy").
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageMapper;

impl LanguageMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map(&self, path: impl AsRef<Path>, content: Option<&str>) -> (String, f32, LanguageCapability) {
        let (language_id, confidence) = detect_language(&path, content);
        let capability = capability_for(&language_id);
        (language_id, confidence, capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_extension_before_content() {
        let mapper = LanguageMapper::new();
        let (lang, confidence, cap) = mapper.map("a.py", Some("def hello(): pass"));
        assert_eq!(lang, "python");
        assert!(confidence >= 0.95);
        assert!(cap.has_grammar_backend);
    }

    #[test]
    fn maps_special_filename() {
        let mapper = LanguageMapper::new();
        let (lang, confidence, _) = mapper.map("Dockerfile", None);
        assert_eq!(lang, "dockerfile");
        assert_eq!(confidence, 1.0);
    }

    #[test]
    fn sniffs_shebang_when_no_extension() {
        let mapper = LanguageMapper::new();
        let (lang, confidence, _) = mapper.map("myscript", Some("#!/usr/bin/env python3\nprint(1)\n"));
        assert_eq!(lang, "python");
        assert!(confidence > 0.0);
    }

    #[test]
    fn unknown_falls_back_to_plaintext() {
        let mapper = LanguageMapper::new();
        let (lang, confidence, _) = mapper.map("README", None);
        assert_eq!(lang, "plaintext");
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn ini_aliases_collapse_to_ini() {
        let mapper = LanguageMapper::new();
        for ext in ["ini", "cfg", "conf", "properties"] {
            let (lang, _, _) = mapper.map(format!("f.{ext}"), None);
            assert_eq!(lang, "ini");
        }
    }
}
