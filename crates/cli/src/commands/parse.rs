use std::path::Path;

use anyhow::{Context, Result};
use codelens_engine::Engine;
use serde::Serialize;

#[derive(Serialize)]
struct ParseOutput<'a> {
    success: bool,
    errors: &'a [codelens_core::Diagnostic],
    tree: &'a codelens_core::UnifiedNode,
}

pub fn run(engine: &Engine, path: &Path, pretty: bool) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let parsed = engine.parse(&path.display().to_string(), &bytes);
    let output = ParseOutput { success: parsed.success, errors: &parsed.errors, tree: parsed.tree.root() };

    let json = if pretty { serde_json::to_string_pretty(&output)? } else { serde_json::to_string(&output)? };
    println!("{json}");
    Ok(())
}
