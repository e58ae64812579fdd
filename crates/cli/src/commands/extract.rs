use std::path::Path;

use anyhow::{Context, Result};
use codelens_core::{Block, ExtractedFeatures};
use codelens_engine::Engine;
use serde::Serialize;

#[derive(Serialize)]
struct ExtractOutput {
    features: ExtractedFeatures,
    blocks: Vec<Block>,
}

pub fn run(engine: &Engine, path: &Path, pretty: bool) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let path_str = path.display().to_string();
    let classification = engine.classify(&path_str, &bytes);
    let parsed = engine.parse(&path_str, &bytes);

    let features = codelens_extract::extract_features(&classification.language_id, &parsed.tree, &bytes, None);
    let blocks = codelens_extract::extract_blocks(&classification.language_id, &bytes, &parsed.tree);
    let output = ExtractOutput { features, blocks };

    let json = if pretty { serde_json::to_string_pretty(&output)? } else { serde_json::to_string(&output)? };
    println!("{json}");
    Ok(())
}
