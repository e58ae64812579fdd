use std::path::Path;

use anyhow::{Context, Result};
use codelens_engine::Engine;

pub fn run(engine: &Engine, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let classification = engine.classify(&path.display().to_string(), &bytes);
    println!("{}", serde_json::to_string_pretty(&classification)?);
    Ok(())
}
