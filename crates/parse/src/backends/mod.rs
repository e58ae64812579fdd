pub mod grammar;
pub mod ini;
pub mod plaintext;

pub use grammar::{GrammarParser, QueryMetrics, QueryOptions, RawCapture};
pub use ini::IniParser;
pub use plaintext::PlaintextParser;
