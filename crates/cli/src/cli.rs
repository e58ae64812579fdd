use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "codelens", bin_name = "codelens")]
#[command(about = "Inspect the codelens classifier, parsers, and pattern engine from the command line")]
pub struct Cli {
    /// Path to a TOML file overriding `EngineConfig` defaults.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify a file's language, file type, and parser backend
    Classify {
        /// File to classify
        path: PathBuf,
    },

    /// Parse a file and print its unified syntax tree as JSON
    Parse {
        path: PathBuf,

        /// Pretty-print the JSON tree
        #[arg(long)]
        pretty: bool,
    },

    /// Run a pattern (loaded from a JSON file) against a source file
    Match {
        /// Path to a JSON-encoded `Pattern`
        pattern_file: PathBuf,

        /// Source file to match against
        source: PathBuf,

        #[arg(long)]
        pretty: bool,
    },

    /// Run the cross-project learner over a sample of a project's files
    Learn {
        /// Canonical language id (e.g. `python`, `rust`)
        language: String,

        /// Project root to sample files from
        project_dir: PathBuf,
    },

    /// List every language the engine can classify and/or parse
    Langs,

    /// Extract syntax/structure/semantics/documentation features and blocks
    Extract {
        path: PathBuf,

        #[arg(long)]
        pretty: bool,
    },
}
