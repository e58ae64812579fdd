//! End-to-end scenarios from spec §8: python function, JSON nesting,
//! resilient recovery, and learner improvement acceptance.

use codelens_core::{PatternCategory, PatternMetadata, PatternPurpose, PatternVariant};
use codelens_core::{FileType, Pattern};
use codelens_engine::Engine;

fn base_pattern(name: &str, language_id: &str, query: &str) -> Pattern {
    Pattern {
        name: name.to_string(),
        language_id: language_id.to_string(),
        category: PatternCategory::Structure,
        purpose: PatternPurpose::Understanding,
        confidence: 0.9,
        variant: PatternVariant::Base,
        query: Some(query.to_string()),
        regex: None,
        fallback_patterns: Vec::new(),
        metadata: PatternMetadata::default(),
    }
}

#[test]
fn scenario_python_function() {
    let engine = Engine::default();
    engine.register_pattern(base_pattern(
        "function",
        "python",
        "(function_definition name: (identifier) @name parameters: (parameters) @parameters) @fn",
    ));

    let source = "def hello(x, y):\n    return x + y\n";
    let classification = engine.classify("a.py", source.as_bytes());
    assert_eq!(classification.language_id, "python");
    assert_eq!(classification.file_type, FileType::Code);
    assert!(classification.confidence >= 0.95);
    assert!(!classification.is_binary);

    let parsed = engine.parse("a.py", source.as_bytes());
    let matches = engine.matches_pattern(source, "function", &parsed, "python", "a.py");

    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    assert_eq!(m.start_point, codelens_core::Point::new(0, 0));
    assert_eq!(m.captures["name"][0].text, "hello");
    assert!(m.captures["parameters"][0].text.contains("x, y"));
}

#[test]
fn scenario_json_nested_array() {
    let engine = Engine::default();
    engine.register_pattern(base_pattern("object", "json", "(object) @obj"));
    engine.register_pattern(base_pattern("array", "json", "(array) @arr"));

    let source = r#"{"items":[1,2,3],"name":"kit"}"#;
    let parsed = engine.parse("a.json", source.as_bytes());

    let objects = engine.matches_pattern(source, "object", &parsed, "json", "a.json");
    let arrays = engine.matches_pattern(source, "array", &parsed, "json", "a.json");

    assert_eq!(objects.len(), 1);
    assert_eq!(arrays.len(), 1);
    let object_range = objects[0].captures["obj"][0].byte_range;
    let array_range = arrays[0].captures["arr"][0].byte_range;
    assert!(array_range.start > object_range.start && array_range.end < object_range.end);
}

#[test]
fn scenario_ini_comment_and_section_round_trip() {
    let engine = Engine::default();
    let source = "; top comment\n[db]\nhost=localhost\nport=5432\n";
    let classification = engine.classify("a.ini", source.as_bytes());
    assert_eq!(classification.language_id, "ini");

    let parsed = engine.parse("a.ini", source.as_bytes());
    assert!(parsed.success);

    let root = parsed.tree.root();
    assert_eq!(root.children.len(), 2, "a root-level comment, then the section");

    let comment = &root.children[0];
    assert_eq!(comment.kind, "comment");
    assert_eq!(comment.start_point, codelens_core::Point::new(0, 0));
    // The round trip reproduces the original line, marker included.
    assert_eq!(comment.text(source.as_bytes()), "; top comment");

    let section = &root.children[1];
    assert_eq!(section.kind, "section");
    assert_eq!(section.children.len(), 2);
    assert_eq!(section.children[0].kind, "property");
    assert_eq!(section.children[1].kind, "property");
}

#[test]
fn scenario_malformed_c_still_matches_function() {
    let engine = Engine::default();
    engine.register_pattern(base_pattern("function", "c", "(function_definition) @fn"));

    let source = "int main() { int x = ; }";
    let parsed = engine.parse("a.c", source.as_bytes());
    assert!(!parsed.success);
    assert!(!parsed.errors.is_empty());

    let matches = engine.matches_pattern(source, "function", &parsed, "c", "a.c");
    assert_eq!(matches.len(), 1);
    assert!(matches[0].text.starts_with("int main"));
}

#[test]
fn scenario_resilient_recovery_falls_back_to_named_pattern() {
    let engine = Engine::default();
    // A working pattern that would find the function directly.
    engine.register_pattern(base_pattern("function_fallback", "python", "(function_definition) @fn"));
    // The "primary" pattern targets a node kind absent from this source, so
    // its grammar query runs but matches nothing and recovery kicks in.
    engine.register_pattern(Pattern {
        name: "function_resilient".to_string(),
        language_id: "python".to_string(),
        category: PatternCategory::Structure,
        purpose: PatternPurpose::Understanding,
        confidence: 0.9,
        variant: PatternVariant::Resilient,
        query: Some("(class_definition) @cls".to_string()),
        regex: None,
        fallback_patterns: vec!["function_fallback".to_string()],
        metadata: PatternMetadata::default(),
    });

    let source = "def hello(x, y):\n    return x + y\n";
    let parsed = engine.parse("a.py", source.as_bytes());
    let matches = engine.matches_pattern(source, "function_resilient", &parsed, "python", "a.py");

    assert!(!matches.is_empty());
    assert!(matches.iter().all(|m| m.strategy == codelens_core::MatchStrategy::FallbackPattern));

    let recovery = engine.recovery_metrics_for("function_resilient");
    assert!(recovery.successes.load(std::sync::atomic::Ordering::Acquire) >= 1);
    assert!(recovery.strategy_successes(codelens_core::MatchStrategy::FallbackPattern) >= 1);
}

#[test]
fn scenario_learner_improvement_validates_against_test_cases() {
    let dir = tempfile::tempdir().expect("tempdir");
    for i in 0..5 {
        let source = format!("def fn_{i}(x):\n    if x:\n        return x\n    return None\n");
        std::fs::write(dir.path().join(format!("mod_{i}.py")), source).expect("write sample");
    }

    let engine = Engine::default();
    engine.register_pattern(Pattern {
        name: "function".to_string(),
        language_id: "python".to_string(),
        category: PatternCategory::Structure,
        purpose: PatternPurpose::Understanding,
        confidence: 0.9,
        variant: PatternVariant::Base,
        query: Some("(function_definition name: (identifier) @name) @fn".to_string()),
        regex: None,
        fallback_patterns: Vec::new(),
        metadata: PatternMetadata {
            test_cases: vec![codelens_core::PatternTestCase {
                name: "one_function".to_string(),
                source: "def f(x):\n    return x\n".to_string(),
                expected_match_count: 1,
            }],
            ..PatternMetadata::default()
        },
    });

    let report = engine.learn("python", dir.path());
    assert_eq!(report.sampled_files, 5);
    // Whichever the outcome, the pattern's declared test case must still
    // hold afterwards: an accepted improvement never regresses it.
    let parsed = engine.parse("case.py", b"def f(x):\n    return x\n");
    let matches = engine.matches_pattern("def f(x):\n    return x\n", "function", &parsed, "python", "case.py");
    assert_eq!(matches.len(), 1);
}
