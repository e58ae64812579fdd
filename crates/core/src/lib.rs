//! Shared data model for the codelens analysis engine: `FileClassification`,
//! `ParseTree`, `Pattern` and friends, `ExtractedFeatures`, metrics, and the
//! capability interfaces for the engine's external collaborators.

pub mod classification;
pub mod collab;
pub mod config;
pub mod error;
pub mod fastmap;
pub mod features;
pub mod metrics;
pub mod pattern;
pub mod tree;

pub use classification::{FileClassification, FileType, LanguageCapability, ParserKind};
pub use config::{ConfigError, EngineConfig};
pub use error::{DispatchError, DispatchResult};
pub use fastmap::{FastMap, FastSet};
pub use features::{
    Block, ComplexityMetrics, Documentation, ExtractedFeatures, FeatureCategory, SemanticFeatures,
    StructureFeatures, SyntaxFeatures,
};
pub use metrics::{PatternPerformanceMetrics, RecoveryMetrics};
pub use pattern::{
    capture_from_node, capture_from_span, sort_matches_in_source_order, strategy_weight, Capture,
    MatchStrategy, Pattern, PatternCategory, PatternContext, PatternMatch, PatternMetadata,
    PatternPurpose, PatternRelationship, PatternTestCase, PatternVariant, PredicateResult,
    RelationKind,
};
pub use tree::{
    flatten_tree_sitter, ByteRange, CustomTree, Diagnostic, DiagnosticKind, GrammarTree,
    ParseResult, ParseTree, Point, UnifiedNode,
};

/// A cooperative cancellation flag, checked at node and file boundaries per
/// spec §5 "Cancellation".
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}
