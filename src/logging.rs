// Logging setup (tracing + tracing-subscriber)

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global subscriber
///
/// RUST_LOG overrides the default `info` level,
/// e.g. `RUST_LOG=residency_tracker=debug`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Verbose logging for tests; safe to call more than once
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
