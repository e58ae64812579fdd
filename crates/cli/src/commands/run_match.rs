use std::path::Path;

use anyhow::{Context, Result};
use codelens_core::Pattern;
use codelens_engine::Engine;

pub fn run(engine: &Engine, pattern_file: &Path, source_path: &Path, pretty: bool) -> Result<()> {
    let pattern_json =
        std::fs::read_to_string(pattern_file).with_context(|| format!("reading {}", pattern_file.display()))?;
    let pattern: Pattern =
        serde_json::from_str(&pattern_json).with_context(|| format!("parsing pattern `{}`", pattern_file.display()))?;

    let bytes = std::fs::read(source_path).with_context(|| format!("reading {}", source_path.display()))?;
    let source = String::from_utf8_lossy(&bytes).into_owned();
    let path_str = source_path.display().to_string();

    let classification = engine.classify(&path_str, &bytes);
    let parsed = engine.parse(&path_str, &bytes);
    let matches = engine.matches(&source, &pattern, &parsed, &classification.language_id, &path_str);

    let json = if pretty { serde_json::to_string_pretty(&matches)? } else { serde_json::to_string(&matches)? };
    println!("{json}");
    Ok(())
}
