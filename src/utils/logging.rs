//! Logging setup.
//!
//! Console output through `tracing-subscriber`, filtered by `RUST_LOG`
//! (defaults to `info`).

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Returns false if one was already installed.
pub fn init_logging() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
