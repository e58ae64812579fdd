use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process-wide tunables. Constructed once per `Engine` handle; never a
/// global singleton (spec §9 "Global mutable state").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bytes sampled from the head of a file for the binary sniff (spec §4.2 step 1).
    pub binary_sniff_window: usize,
    /// Fraction of non-text bytes in the sniff window above which a file is binary.
    pub binary_sniff_threshold: f32,
    /// Soft cap on captures/time per query execution.
    pub default_match_limit: usize,
    pub default_timeout_micros: u64,
    /// Cross-project learner defaults (spec §4.5.6 step 1).
    pub learner_sample_size: usize,
    pub learner_max_file_bytes: u64,
    /// Directory pattern insights are persisted under (spec §6).
    pub insights_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary_sniff_window: 1024,
            binary_sniff_threshold: 0.30,
            default_match_limit: 10_000,
            default_timeout_micros: 50_000,
            learner_sample_size: 100,
            learner_max_file_bytes: 500 * 1024,
            insights_dir: "insights".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file `{0}`: {1}")]
    Read(String, std::io::Error),
    #[error("failed to parse config file `{0}`: {1}")]
    Parse(String, toml::de::Error),
}

impl EngineConfig {
    /// Loads overrides from a TOML file; any field it omits keeps its
    /// `Default` value via `#[serde(default)]`.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse(path.display().to_string(), e))
    }
}
