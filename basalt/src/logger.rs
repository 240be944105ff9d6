//! Logging setup: tracing-subscriber with env-filter, bridging the `log`
//! facade the library crates emit through.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    // Route log-facade records (the library crates) into tracing.
    let _ = tracing_log::LogTracer::init();
}
