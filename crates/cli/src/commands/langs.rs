use anyhow::Result;
use codelens_engine::Engine;

pub fn run(engine: &Engine) -> Result<()> {
    let mut languages = engine.list_languages();
    languages.sort();
    println!("supported languages ({}):", languages.len());
    for language in languages {
        println!("  {language}");
    }
    Ok(())
}
