//! Tracing setup for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber with `RUST_LOG`-style filtering.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
