use thiserror::Error;

/// Lifecycle failures only: the spec is explicit that construction/resource
/// failures are the *only* errors surfaced to callers. Everything else
/// (parse, pattern compilation/execution) is absorbed into structured
/// diagnostics instead of this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no parser available for language `{0}`")]
    UnsupportedLanguage(String),

    #[error("parser for language `{0}` is temporarily unavailable: {1}")]
    ParserUnavailable(String, String),
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
