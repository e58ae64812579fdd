//! Pattern Engine (spec §4.5): pattern catalog, Base/Adaptive/Resilient
//! matching, and the cross-project learner.

mod adapt;
mod catalog;
mod compile;
mod engine;
mod learner;
mod matching;
mod resilient;

pub use catalog::PatternCatalog;
pub use compile::{CompileError, RegexCache};
pub use engine::Engine;
pub use learner::{ImprovedPattern, LearnerReport, PatternInsights};
pub use matching::MatchRunner;
