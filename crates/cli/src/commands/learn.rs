use std::path::Path;

use anyhow::Result;
use codelens_engine::Engine;

pub fn run(engine: &Engine, language: &str, project_dir: &Path) -> Result<()> {
    let report = engine.learn(language, project_dir);

    println!("sampled {} file(s)", report.sampled_files);
    if report.improved.is_empty() {
        println!("no patterns improved");
    } else {
        println!("improved:");
        for improved in &report.improved {
            println!("  {} -> confidence {:.3}", improved.pattern_name, improved.new_confidence);
        }
    }
    if !report.rejected.is_empty() {
        println!("rejected (failed validation):");
        for name in &report.rejected {
            println!("  {name}");
        }
    }
    Ok(())
}
