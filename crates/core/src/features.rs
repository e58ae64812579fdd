use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::pattern::PatternCategory;
use crate::tree::{ByteRange, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureCategory {
    Syntax,
    Structure,
    Semantics,
    Documentation,
}

/// Every feature category has at least one pattern category that feeds it
/// (spec §3 invariant: the mapping is total).
pub fn feeding_pattern_categories(category: FeatureCategory) -> &'static [PatternCategory] {
    match category {
        FeatureCategory::Syntax => &[PatternCategory::Syntax, PatternCategory::CodePatterns],
        FeatureCategory::Structure => &[PatternCategory::Structure, PatternCategory::BestPractices],
        FeatureCategory::Semantics => &[
            PatternCategory::Semantics,
            PatternCategory::Learning,
            PatternCategory::CommonIssues,
        ],
        FeatureCategory::Documentation => {
            &[PatternCategory::Documentation, PatternCategory::UserPatterns]
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntaxFeatures {
    pub literals: Vec<String>,
    pub operators: Vec<String>,
    pub keywords: Vec<String>,
    pub identifiers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureFeatures {
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub modules: Vec<String>,
    pub blocks: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticFeatures {
    pub imports: Vec<String>,
    pub references: Vec<String>,
    pub dependencies: Vec<String>,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Documentation {
    pub comments: Vec<String>,
    pub doc_comments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub cyclomatic: u32,
    pub cognitive: u32,
    pub halstead_distinct_operators: u32,
    pub halstead_distinct_operands: u32,
    pub halstead_volume: f64,
    pub maintainability_index: f64,
    pub node_count: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedFeatures {
    pub syntax: SyntaxFeatures,
    pub structure: StructureFeatures,
    pub semantics: SemanticFeatures,
    pub documentation: Documentation,
    pub metrics: ComplexityMetrics,
    pub metadata: HashMap<String, String>,
    /// Populated only when extraction hit an internal failure; extraction
    /// never throws (spec §4.6 point 4).
    pub diagnostics: Vec<String>,
}

/// A contiguous source region corresponding to a structurally meaningful
/// subtree (function body, class body, INI section, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub content: String,
    pub start_point: Point,
    pub end_point: Point,
    pub byte_range: ByteRange,
    pub kind: String,
    pub metadata: HashMap<String, String>,
    pub confidence: f32,
}
