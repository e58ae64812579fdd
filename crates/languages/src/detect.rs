//! The Language Mapper: `(path, content?) -> (language_id, confidence)`.
//!
//! Implements spec §4.1 exactly: special filename, then extension, then
//! content sniffers, then `"plaintext"`. This component never fails.

use std::path::Path;

use crate::tables::{EXTENSION_TO_LANGUAGE, SPECIAL_FILENAMES};

/// A content sniffer inspects a content prefix and, if it recognizes the
/// content, returns `(language_id, confidence)`. Order here is the
/// "stable published order" spec §4.1 step 3 asks for as a tie-break.
type Sniffer = fn(&str) -> Option<(&'static str, f32)>;

const SNIFFERS: &[Sniffer] = &[
    sniff_shebang,
    sniff_xml_prolog,
    sniff_json_like,
];

fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("")
}

fn sniff_shebang(content: &str) -> Option<(&'static str, f32)> {
    let line = first_line(content);
    if !line.starts_with("#!") {
        return None;
    }
    let lang = if line.contains("python") {
        "python"
    } else if line.contains("node") {
        "javascript"
    } else if line.contains("bash") || line.contains("sh") {
        "bash"
    } else if line.contains("perl") {
        "perl"
    } else if line.contains("ruby") {
        "ruby"
    } else {
        return None;
    };
    Some((lang, 0.9))
}

fn sniff_xml_prolog(content: &str) -> Option<(&'static str, f32)> {
    if content.trim_start().starts_with("<?xml") {
        Some(("xml", 0.85))
    } else {
        None
    }
}

fn sniff_json_like(content: &str) -> Option<(&'static str, f32)> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Some(("json", 0.4))
    } else {
        None
    }
}

/// Runs every sniffer, keeping the highest-confidence result; ties are
/// broken by the order sniffers are declared in `SNIFFERS`.
fn sniff_content(content: &str) -> Option<(&'static str, f32)> {
    SNIFFERS
        .iter()
        .filter_map(|sniffer| sniffer(content))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

/// Detects the canonical language id for a file, given its path and an
/// optional content prefix (spec suggests up to 4 KiB; the caller decides
/// how much to pass). Returns `(language_id, confidence)`; never fails.
pub fn detect_language(path: impl AsRef<Path>, content: Option<&str>) -> (String, f32) {
    let path = path.as_ref();

    if let Some(basename) = path.file_name().and_then(|n| n.to_str()) {
        if let Some(lang) = SPECIAL_FILENAMES.get(basename) {
            return (lang.to_string(), 1.0);
        }
    }

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext_lower = ext.to_lowercase();
        if let Some(lang) = EXTENSION_TO_LANGUAGE.get(ext_lower.as_str()) {
            return (lang.to_string(), 0.95);
        }
    }

    if let Some(content) = content {
        if let Some((lang, confidence)) = sniff_content(content) {
            return (lang.to_string(), confidence);
        }
    }

    ("plaintext".to_string(), 0.0)
}
