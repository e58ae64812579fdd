use tracing_subscriber::EnvFilter;

/// Installs a `tracing-subscriber` `fmt` layer reading `RUST_LOG`, defaulting
/// to `info` (spec §6 ambient ops stack).
pub fn setup() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
