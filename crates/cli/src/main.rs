mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use codelens_core::EngineConfig;
use codelens_engine::Engine;

use cli::{Cli, Command};

fn main() -> Result<()> {
    logging::setup();

    let args = Cli::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config);

    match args.command {
        Command::Classify { path } => commands::classify::run(&engine, &path),
        Command::Parse { path, pretty } => commands::parse::run(&engine, &path, pretty),
        Command::Match { pattern_file, source, pretty } => {
            commands::run_match::run(&engine, &pattern_file, &source, pretty)
        }
        Command::Learn { language, project_dir } => commands::learn::run(&engine, &language, &project_dir),
        Command::Langs => commands::langs::run(&engine),
        Command::Extract { path, pretty } => commands::extract::run(&engine, &path, pretty),
    }
}
